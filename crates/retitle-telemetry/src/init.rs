//! Tracing subscriber installation for resolver hosts.
//!
//! # Design
//! - `RUST_LOG` wins over the configured level so operators can raise verbosity per
//!   module (`retitle_engine=debug`) without touching configuration.
//! - Span close events are optional; enabling them reports the time spent evaluating
//!   each item.
//! - The installed format is remembered once per process.

use once_cell::sync::OnceCell;
use serde::Deserialize;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TelemetryError};

/// Level used when neither `RUST_LOG` nor the configuration provides one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

static INSTALLED_FORMAT: OnceCell<LogFormat> = OnceCell::new();

/// Output encoding of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable lines.
    Pretty,
}

impl LogFormat {
    /// Pretty output for debug builds, JSON otherwise.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Logging section of a host configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive applied when `RUST_LOG` is unset.
    pub level: String,
    /// Output format; inferred from the build profile when absent.
    pub format: Option<LogFormat>,
    /// Emit an event when each evaluation span closes.
    pub span_timings: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: None,
            span_timings: false,
        }
    }
}

impl LoggingConfig {
    /// Format that [`init_logging`] will install.
    #[must_use]
    pub fn effective_format(&self) -> LogFormat {
        self.format.unwrap_or_else(LogFormat::infer)
    }
}

/// Install the global tracing subscriber and return the format in use.
///
/// # Errors
///
/// Returns [`TelemetryError::SubscriberInstall`] when a global subscriber already exists.
pub fn init_logging(config: &LoggingConfig) -> Result<LogFormat> {
    let format = config.effective_format();
    let spans = if config.span_timings {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_span_events(spans))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_span_events(spans))
            .try_init(),
    };
    installed.map_err(|source| TelemetryError::SubscriberInstall { format, source })?;
    INSTALLED_FORMAT.get_or_init(|| format);
    Ok(format)
}

/// Format installed by [`init_logging`], if it has run successfully.
#[must_use]
pub fn installed_format() -> Option<LogFormat> {
    INSTALLED_FORMAT.get().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_section_deserializes_with_defaults() -> std::result::Result<(), serde_json::Error>
    {
        let config: LoggingConfig = serde_json::from_str(r#"{ "format": "json" }"#)?;
        assert_eq!(config.level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.effective_format(), LogFormat::Json);
        assert!(!config.span_timings);

        let inferred = LoggingConfig::default();
        assert_eq!(inferred.effective_format(), LogFormat::infer());
        Ok(())
    }

    #[test]
    fn unknown_format_is_rejected() {
        let parsed = serde_json::from_str::<LoggingConfig>(r#"{ "format": "xml" }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn second_install_fails_and_keeps_first_format() {
        let config = LoggingConfig {
            level: "retitle_engine=debug".to_string(),
            format: Some(LogFormat::Pretty),
            span_timings: true,
        };
        let first = init_logging(&config);
        let second = init_logging(&config);
        assert!(second.is_err());
        if first.is_ok() {
            assert_eq!(installed_format(), Some(LogFormat::Pretty));
        }
    }
}
