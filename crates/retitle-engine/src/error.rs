//! Error types for the resolution engine.
//!
//! Resolution outcomes (ambiguous, no match, suppressed, ...) are values, not errors;
//! this enum only covers construction failures, collaborator failures and malformed
//! input.

use retitle_config::ConfigError;
use retitle_core::ItemId;
use retitle_patterns::PatternError;
use retitle_telemetry::TelemetryError;
use thiserror::Error;

/// Errors surfaced by the resolver and catalog matcher.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A collaborator (catalog, store, categorizer, item source) failed.
    #[error("collaborator operation failed")]
    Collaborator {
        /// Collaborator operation that failed.
        operation: &'static str,
        /// Item under evaluation, when known.
        item_id: Option<ItemId>,
        /// Underlying collaborator error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Input could not be interpreted.
    #[error("invalid resolver input")]
    InvalidInput {
        /// Input field that was rejected.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Machine-readable reason for the rejection.
        reason: &'static str,
    },
    /// The engine configuration is invalid.
    #[error("invalid engine configuration")]
    Config {
        /// Underlying validation error.
        #[from]
        source: ConfigError,
    },
    /// The pattern library failed to compile.
    #[error("failed to build pattern library")]
    Patterns {
        /// Underlying compile error.
        #[from]
        source: PatternError,
    },
    /// The metrics registry could not be created.
    #[error("failed to build metrics registry")]
    Telemetry {
        /// Underlying telemetry error.
        #[from]
        source: TelemetryError,
    },
}

impl EngineError {
    pub(crate) fn collaborator(
        operation: &'static str,
        item_id: Option<ItemId>,
    ) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Self::Collaborator {
            operation,
            item_id,
            source: source.into(),
        }
    }
}

/// Convenience result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
