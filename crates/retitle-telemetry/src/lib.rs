//! Logging and metrics shared across the retitle workspace.
//!
//! Layout: `init.rs` (tracing subscriber installation), `metrics.rs` (Prometheus
//! registry for resolution passes), `error.rs` (`TelemetryError`).

pub mod error;
pub mod init;
pub mod metrics;

pub use error::{CollectorStage, Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging, installed_format};
pub use metrics::{Metrics, MetricsSnapshot};
