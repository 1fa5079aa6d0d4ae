//! Telemetry failures.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::string::FromUtf8Error;

use tracing_subscriber::util::TryInitError;

use crate::init::LogFormat;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Step of collector setup that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorStage {
    /// Constructing the collector from its options.
    Build,
    /// Adding the collector to the registry.
    Register,
}

/// Errors raised while installing logging or maintaining the metrics registry.
#[derive(Debug)]
pub enum TelemetryError {
    /// A global tracing subscriber was already installed.
    SubscriberInstall {
        /// Format that was being installed.
        format: LogFormat,
        /// Underlying installation error.
        source: TryInitError,
    },
    /// A Prometheus collector could not be set up.
    Collector {
        /// Metric name.
        metric: &'static str,
        /// Setup step that failed.
        stage: CollectorStage,
        /// Underlying Prometheus error.
        source: prometheus::Error,
    },
    /// The registry could not be encoded in the text exposition format.
    Exposition {
        /// Underlying Prometheus error.
        source: prometheus::Error,
    },
    /// The encoded exposition was not UTF-8.
    ExpositionUtf8 {
        /// Underlying conversion error.
        source: FromUtf8Error,
    },
}

impl Display for TelemetryError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::SubscriberInstall { .. } => "tracing subscriber already installed",
            Self::Collector {
                stage: CollectorStage::Build,
                ..
            } => "invalid metric collector options",
            Self::Collector {
                stage: CollectorStage::Register,
                ..
            } => "metric collector registration rejected",
            Self::Exposition { .. } => "metrics exposition failed",
            Self::ExpositionUtf8 { .. } => "metrics exposition was not utf-8",
        };
        formatter.write_str(message)
    }
}

impl Error for TelemetryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SubscriberInstall { source, .. } => Some(source),
            Self::Collector { source, .. } | Self::Exposition { source } => Some(source),
            Self::ExpositionUtf8 { source } => Some(source),
        }
    }
}
