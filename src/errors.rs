// src/errors.rs

//! Crate-wide error type.
//!
//! Decode errors cover anything that goes wrong turning a document into the
//! typed tree (syntax, unknown keys, ambiguous blocks). Validation errors are
//! the first invariant violation found after finalize.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ConfigError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        ConfigError::Validation(msg.into())
    }

    /// The bare message, without the category prefix.
    pub fn message(&self) -> String {
        match self {
            ConfigError::Decode(msg) | ConfigError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ConfigError>;
