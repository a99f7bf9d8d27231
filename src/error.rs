use thiserror::Error;

/// Main error type for the Q-learning trader
#[derive(Error, Debug)]
pub enum QtradeError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Trading engine errors
    #[error("Trading engine error: {0}")]
    Engine(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for QtradeError
pub type Result<T> = std::result::Result<T, QtradeError>;

impl QtradeError {
    /// Build a validation error from a list of violated rules
    pub fn from_violations(violations: Vec<String>) -> Self {
        QtradeError::Validation(violations.join("; "))
    }
}
