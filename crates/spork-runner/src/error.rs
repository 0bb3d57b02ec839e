use spork_platformer::level::LevelError;

#[derive(Debug)]
pub enum RunnerError {
    Io(std::io::Error),
    Level(LevelError),
    Config(String),
    Output(serde_json::Error),
    Task(tokio::task::JoinError),
}

impl std::fmt::Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read level file: {e}"),
            Self::Level(e) => write!(f, "{e}"),
            Self::Config(m) => write!(f, "invalid runner config: {m}"),
            Self::Output(e) => write!(f, "failed to encode match result: {e}"),
            Self::Task(e) => write!(f, "match task failed: {e}"),
        }
    }
}

impl std::error::Error for RunnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Level(e) => Some(e),
            Self::Config(_) => None,
            Self::Output(e) => Some(e),
            Self::Task(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for RunnerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<LevelError> for RunnerError {
    fn from(e: LevelError) -> Self {
        Self::Level(e)
    }
}

impl From<toml::de::Error> for RunnerError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<serde_json::Error> for RunnerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Output(e)
    }
}

impl From<tokio::task::JoinError> for RunnerError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e)
    }
}
