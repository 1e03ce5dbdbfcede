//! Configuration errors

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "Can't load unexpected child app \"{app}\", please provide the entry parameters or register the app in advance"
    )]
    MissingEntry { app: String },

    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
