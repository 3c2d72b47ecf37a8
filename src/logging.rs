//! Per-invocation log settings.
//!
//! `main` installs the runtime's default subscriber once. When the
//! configuration asks for debug output, the invocation runs under its own
//! dispatcher instead, so the verbosity change ends with the invocation.

use tracing::Dispatch;
use tracing::level_filters::LevelFilter;

use crate::config::Configuration;

/// Environment variable the Lambda runtime uses to select the log format.
pub const LOG_FORMAT_ENV: &str = "AWS_LAMBDA_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Reads the format the Lambda runtime was configured with.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map_or(Self::Text, |format| Self::parse(&format))
    }

    #[must_use]
    pub fn parse(format: &str) -> Self {
        if format.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Logging overrides for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    /// `None` keeps the process-wide subscriber untouched.
    pub level: Option<LevelFilter>,
    pub format: LogFormat,
}

impl LogSettings {
    #[must_use]
    pub fn new(config: &Configuration, format: LogFormat) -> Self {
        Self {
            level: config.debug.then_some(LevelFilter::DEBUG),
            format,
        }
    }

    /// Builds the dispatcher the invocation should run under, if any.
    #[must_use]
    pub fn dispatch(&self) -> Option<Dispatch> {
        let level = self.level?;
        let builder = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .without_time();

        Some(match self.format {
            LogFormat::Text => Dispatch::new(builder.finish()),
            LogFormat::Json => Dispatch::new(builder.json().finish()),
        })
    }
}
