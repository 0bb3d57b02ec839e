pub mod config;
pub mod error;
pub mod game_loop;

use std::path::Path;

use spork_platformer::level::LevelDefinition;

use error::RunnerError;

/// Read a JSON level definition, or use the built-in training level when no
/// path is given.
pub fn load_level(path: Option<&Path>) -> Result<LevelDefinition, RunnerError> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            let def = LevelDefinition::from_json(&json)?;
            tracing::info!(path = %path.display(), "loaded level definition");
            Ok(def)
        },
        None => Ok(LevelDefinition::training_grounds()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_path_gives_training_level() {
        let def = load_level(None).unwrap();
        assert_eq!(def.name.as_deref(), Some("Training Grounds"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_level(Some(Path::new("/nonexistent/spork-level.json"))).unwrap_err();
        assert!(matches!(err, RunnerError::Io(_)));
    }

    #[test]
    fn bad_json_is_level_error() {
        let path = std::env::temp_dir().join(format!("spork-bad-level-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_level(Some(&path)).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(matches!(err, RunnerError::Level(_)));
    }
}
