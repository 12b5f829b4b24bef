use thiserror::Error;

pub type OutreachResult<T> = Result<T, OutreachError>;

#[derive(Error, Debug)]
pub enum OutreachError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for OutreachError {
    fn from(err: config::ConfigError) -> Self {
        OutreachError::Config(err.to_string())
    }
}
