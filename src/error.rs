//! Error types for fz-assist.

use std::time::Duration;

use crate::profile::Persona;
use crate::wizard::SessionStep;

/// Top-level error type for the assistant.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Recommendations unavailable: {0}")]
    RecommendationUnavailable(#[from] RetrievalError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {key}. {hint}")]
    MissingEnvVar { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from the hosted query engine (retrieval + LLM service).
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("Query engine request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Query engine rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Query engine authentication failed")]
    AuthFailed,

    #[error("Invalid response from query engine: {reason}")]
    InvalidResponse { reason: String },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Wizard validation and transition errors.
///
/// These are always recovered locally by re-prompting; they never terminate
/// a session.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Answer required for: {field}")]
    EmptyAnswer { field: &'static str },

    #[error("Follow-up answers are for the {got} persona, but {expected} was selected")]
    PersonaMismatch {
        expected: Persona,
        got: Persona,
    },

    #[error("Action '{action}' is not available in the {step} step")]
    InvalidStep {
        action: &'static str,
        step: SessionStep,
    },
}

/// Result type alias for the assistant.
pub type Result<T> = std::result::Result<T, Error>;
