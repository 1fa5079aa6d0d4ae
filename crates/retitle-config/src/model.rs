//! Typed configuration models.
//!
//! # Design
//! - Every section deserializes with defaults so partial documents are valid.
//! - Unknown fields are rejected to surface typos early.

use retitle_patterns::{DEFAULT_ABUSE_ORIGINS, MAX_TITLE_CHARS};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Whether the resolver persists its decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// Persist renames, catalog links and processed flags.
    #[default]
    Apply,
    /// Count and log what would change without persisting anything.
    Preview,
}

impl ResolveMode {
    /// Parse a mode name, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] for unknown names.
    pub fn parse(value: &str) -> ConfigResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "apply" => Ok(Self::Apply),
            "preview" => Ok(Self::Preview),
            _ => Err(ConfigError::invalid(
                "engine",
                "mode",
                Some(value.to_string()),
                "expected apply or preview",
            )),
        }
    }

    /// Whether persistence is suppressed.
    #[must_use]
    pub const fn is_preview(self) -> bool {
        matches!(self, Self::Preview)
    }
}

/// Catalog matching thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchThresholds {
    /// Maximum records requested from a token search.
    pub fuzzy_limit: usize,
    /// Largest result set still verified record by record; anything larger is ambiguous.
    pub max_verified: usize,
    /// Minimum filename suffix similarity, in percent.
    pub similarity_min: f64,
    /// Largest accepted size difference between fingerprint peers, in percent.
    pub size_tolerance_pct: i64,
    /// Shortest title worth a catalog query, in characters.
    pub min_title_chars: usize,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            fuzzy_limit: 21,
            max_verified: 15,
            similarity_min: 93.0,
            size_tolerance_pct: 10,
            min_title_chars: 15,
        }
    }
}

/// Title canonicalization policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanonPolicy {
    /// Storage limit for titles, in characters.
    pub max_title_chars: usize,
    /// Uploader signatures whose trailing group tags are rewritten.
    pub abuse_origins: Vec<String>,
}

impl Default for CanonPolicy {
    fn default() -> Self {
        Self {
            max_title_chars: MAX_TITLE_CHARS,
            abuse_origins: DEFAULT_ABUSE_ORIGINS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Persistence mode.
    pub mode: ResolveMode,
    /// Only accept catalog matches; skip the heuristic cascades.
    pub catalog_only: bool,
    /// Matching thresholds.
    pub matching: MatchThresholds,
    /// Canonicalization policy.
    pub canon: CanonPolicy,
}

impl EngineConfig {
    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        let matching = &self.matching;
        if matching.fuzzy_limit == 0 {
            return Err(ConfigError::invalid(
                "matching",
                "fuzzy_limit",
                Some(matching.fuzzy_limit.to_string()),
                "must be positive",
            ));
        }
        if matching.max_verified >= matching.fuzzy_limit {
            return Err(ConfigError::invalid(
                "matching",
                "max_verified",
                Some(matching.max_verified.to_string()),
                "must be below fuzzy_limit",
            ));
        }
        if !(matching.similarity_min > 0.0 && matching.similarity_min <= 100.0) {
            return Err(ConfigError::invalid(
                "matching",
                "similarity_min",
                Some(matching.similarity_min.to_string()),
                "must be within (0, 100]",
            ));
        }
        if !(0..=100).contains(&matching.size_tolerance_pct) {
            return Err(ConfigError::invalid(
                "matching",
                "size_tolerance_pct",
                Some(matching.size_tolerance_pct.to_string()),
                "must be within [0, 100]",
            ));
        }
        if self.canon.max_title_chars == 0 {
            return Err(ConfigError::invalid(
                "canon",
                "max_title_chars",
                Some(self.canon.max_title_chars.to_string()),
                "must be positive",
            ));
        }
        if matching.min_title_chars > self.canon.max_title_chars {
            return Err(ConfigError::invalid(
                "matching",
                "min_title_chars",
                Some(matching.min_title_chars.to_string()),
                "must not exceed canon.max_title_chars",
            ));
        }
        Ok(())
    }
}
