use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use spork_platformer::ai::Difficulty;

use crate::error::RunnerError;

/// Who drives the two match slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Keyboard-driven entity against the AI.
    #[default]
    HumanVsAi,
    /// Both slots driven by AI controllers.
    AiVsAi,
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMode::HumanVsAi => f.write_str("human_vs_ai"),
            MatchMode::AiVsAi => f.write_str("ai_vs_ai"),
        }
    }
}

/// Top-level runner configuration, loaded from `spork.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub mode: MatchMode,
    /// Difficulty of the AI slot.
    pub difficulty: Difficulty,
    /// Difficulty of the first slot in `ai_vs_ai` mode.
    pub rival_difficulty: Difficulty,
    /// JSON level definition. The built-in training level when unset.
    pub level_path: Option<PathBuf>,
    /// Host frames per second.
    pub tick_rate: f32,
    /// Match time limit in seconds of simulated time. Zero disables it.
    pub max_match_secs: f64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::default(),
            difficulty: Difficulty::Normal,
            rival_difficulty: Difficulty::Normal,
            level_path: None,
            tick_rate: 60.0,
            max_match_secs: 300.0,
        }
    }
}

impl RunnerConfig {
    /// Load from `$SPORK_RUNNER_CONFIG` or `spork.toml`, falling back to
    /// defaults.
    pub fn load() -> Self {
        let path =
            std::env::var("SPORK_RUNNER_CONFIG").unwrap_or_else(|_| "spork.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from {path}");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    RunnerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No {path} found, using defaults");
                RunnerConfig::default()
            },
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, RunnerError> {
        let config: RunnerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RunnerError> {
        if !self.tick_rate.is_finite() || self.tick_rate <= 0.0 {
            return Err(RunnerError::Config("tick_rate must be > 0".to_string()));
        }
        if !self.max_match_secs.is_finite() || self.max_match_secs < 0.0 {
            return Err(RunnerError::Config(
                "max_match_secs must be >= 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn time_limit_ms(&self) -> Option<f64> {
        (self.max_match_secs > 0.0).then(|| self.max_match_secs * 1000.0)
    }
}
