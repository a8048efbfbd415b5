use crate::rules::RuleError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QsedError {
    /// A substitution rule could not be parsed or validated
    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),

    /// No substitution rules were configured
    #[error("No rules defined, refusing to start")]
    NoRules,

    /// The configuration file could not be parsed
    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A setting holds a value the engine cannot run with
    #[error("Invalid setting {name}: {message}")]
    InvalidSetting { name: &'static str, message: String },

    /// Failure reported by the packet interception transport
    #[error("Transport error: {0}")]
    Transport(String),
}

/// A convenient Result type alias using `QsedError`.
pub type Result<T> = std::result::Result<T, QsedError>;

impl QsedError {
    /// Creates a new transport error with a description of the failed operation.
    pub fn transport(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::Transport(format!("{} failed: {}", operation, cause))
    }

    /// Creates a new configuration error for the given file.
    pub fn config(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::Config {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
