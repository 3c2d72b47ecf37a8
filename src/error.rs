//! Error types for the Home Assistant forwarder.
//!
//! Every failure that can abort an invocation is one of these variants. The
//! POST read-timeout is deliberately absent: it is reported as `Ok(None)` by
//! [`crate::http::client::HomeAssistant::post`].

use lambda_runtime::Diagnostic;

/// Custom error type for the application.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or invalid settings, or an unreadable/malformed config file.
    #[error("{0}")]
    Configuration(String),

    /// Home Assistant answered with a non-2xx status.
    #[error("Home Assistant returned {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body was not valid JSON.
    #[error("Failed to decode Home Assistant response: {0}")]
    Decode(#[source] serde_json::Error),

    /// Could not reach Home Assistant (DNS failure, TLS error, connection refused, etc.)
    #[error("Failed to reach Home Assistant: {0}")]
    Transport(#[source] reqwest::Error),
}

impl Error {
    /// Shorthand for building a [`Error::Configuration`].
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Stable name of the error kind, reported as the Lambda `errorType`.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "ConfigurationError",
            Self::Http { .. } => "HttpError",
            Self::Decode(_) => "DecodeError",
            Self::Transport(_) => "TransportError",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error)
    }
}

impl From<Error> for Diagnostic {
    fn from(error: Error) -> Self {
        Self {
            error_type: error.error_type().to_string(),
            error_message: error.to_string(),
        }
    }
}
