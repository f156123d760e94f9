use thiserror::Error;

use crate::dom::ElementId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid callback descriptor '{descriptor}': {reason}")]
    CallbackParse { descriptor: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    #[error("Scene error: {0}")]
    Scene(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
