//! Error types for speech-client

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::request::Provider;

/// Result type for speech-client operations
pub type Result<T> = std::result::Result<T, SpeechError>;

/// Coarse classification of a failed synthesis, as reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Credentials missing, unreadable or rejected by the provider
    AuthError,
    /// The provider rejected or canceled the request
    ProviderError,
    /// Local file system failure while writing the audio
    IoError,
    /// No response within the configured interval
    Timeout,
    /// Request rejected locally before any network call
    InvalidRequest,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::AuthError => "AuthError",
            FailureKind::ProviderError => "ProviderError",
            FailureKind::IoError => "IOError",
            FailureKind::Timeout => "Timeout",
            FailureKind::InvalidRequest => "InvalidRequest",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while synthesizing speech
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("{provider} credentials not found ({env_var} is not set)")]
    MissingCredentials { provider: Provider, env_var: String },

    #[error("{provider} authentication failed: {message}")]
    AuthenticationFailed { provider: Provider, message: String },

    #[error("{provider} API error: {message}")]
    ProviderApiError {
        provider: Provider,
        message: String,
        status_code: Option<u16>,
    },

    #[error("{provider} synthesis canceled: {reason}{}", format_details(.details))]
    Canceled {
        provider: Provider,
        reason: String,
        details: Option<String>,
    },

    #[error("{provider} returned an unexpected result: {detail}")]
    UnexpectedState { provider: Provider, detail: String },

    #[error("{provider} request timed out after {}s", .after.as_secs_f64())]
    Timeout { provider: Provider, after: Duration },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_details(details: &Option<String>) -> String {
    details
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

impl SpeechError {
    /// Classify this error for reporting
    pub fn kind(&self) -> FailureKind {
        match self {
            SpeechError::MissingCredentials { .. } | SpeechError::AuthenticationFailed { .. } => {
                FailureKind::AuthError
            }
            SpeechError::ProviderApiError { .. }
            | SpeechError::Canceled { .. }
            | SpeechError::UnexpectedState { .. } => FailureKind::ProviderError,
            SpeechError::Timeout { .. } => FailureKind::Timeout,
            SpeechError::InvalidRequest(_) => FailureKind::InvalidRequest,
            SpeechError::Io(_) => FailureKind::IoError,
        }
    }
}
