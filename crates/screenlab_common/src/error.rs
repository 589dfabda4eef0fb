//! Error types for the screening study core.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudyError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Consent incomplete: {0}")]
    Validation(String),

    #[error("Operation requires the {expected} phase but the session is in {actual}")]
    Phase {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StudyError {
    /// True for errors the presentation layer should re-prompt on
    /// rather than abort the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StudyError::Validation(_) | StudyError::Phase { .. })
    }
}
