use thiserror::Error;

#[derive(Debug, Error)]
pub enum IrError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid plugin parameter {0}")]
    InvalidParameter(String),

    #[error("Invalid logging level {0}")]
    InvalidLevel(String),

    #[error("Invalid template pattern {pattern}: {msg}")]
    InvalidPattern {
        pattern: String,
        msg:     String,
    },
}
