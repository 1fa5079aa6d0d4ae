//! Configuration loading from JSON documents and environment overrides.
//!
//! # Design
//! - Every loader validates before returning, so callers only ever see coherent config.
//! - Environment lookup is injected so overrides can be exercised without mutating the
//!   process environment.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{EngineConfig, ResolveMode};

/// Environment variable selecting [`ResolveMode`].
pub const ENV_MODE: &str = "RETITLE_MODE";
/// Environment variable overriding `matching.max_verified`.
pub const ENV_AMBIGUITY_LIMIT: &str = "RETITLE_AMBIGUITY_LIMIT";
/// Environment variable overriding `matching.similarity_min`.
pub const ENV_SIMILARITY_MIN: &str = "RETITLE_SIMILARITY_MIN";
/// Environment variable overriding `matching.size_tolerance_pct`.
pub const ENV_SIZE_TOLERANCE_PCT: &str = "RETITLE_SIZE_TOLERANCE_PCT";

/// Parse and validate a JSON configuration document.
///
/// # Errors
///
/// Returns [`ConfigError::Json`] for malformed documents and
/// [`ConfigError::InvalidField`] when validation fails.
pub fn load_from_str(document: &str) -> ConfigResult<EngineConfig> {
    let config: EngineConfig =
        serde_json::from_str(document).map_err(|source| ConfigError::Json { source })?;
    config.validate()?;
    Ok(config)
}

/// Read, parse and validate a JSON configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read, otherwise the errors of
/// [`load_from_str`].
pub fn load_from_path(path: impl AsRef<Path>) -> ConfigResult<EngineConfig> {
    let path = path.as_ref();
    let document = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded engine configuration");
    load_from_str(&document)
}

impl EngineConfig {
    /// Apply `RETITLE_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when a variable does not parse or the
    /// resulting configuration fails validation.
    pub fn apply_env_overrides(self) -> ConfigResult<Self> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply `RETITLE_*` overrides resolved through `lookup`.
    ///
    /// # Errors
    ///
    /// Same as [`EngineConfig::apply_env_overrides`].
    pub fn apply_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(ENV_MODE) {
            self.mode = ResolveMode::parse(&mode)?;
        }
        if let Some(limit) = lookup(ENV_AMBIGUITY_LIMIT) {
            self.matching.max_verified = parse_env(ENV_AMBIGUITY_LIMIT, "max_verified", &limit)?;
        }
        if let Some(similarity) = lookup(ENV_SIMILARITY_MIN) {
            self.matching.similarity_min =
                parse_env(ENV_SIMILARITY_MIN, "similarity_min", &similarity)?;
        }
        if let Some(tolerance) = lookup(ENV_SIZE_TOLERANCE_PCT) {
            self.matching.size_tolerance_pct =
                parse_env(ENV_SIZE_TOLERANCE_PCT, "size_tolerance_pct", &tolerance)?;
        }
        self.validate()?;
        Ok(self)
    }
}

fn parse_env<T: std::str::FromStr>(variable: &str, field: &str, raw: &str) -> ConfigResult<T> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidField {
        section: variable.to_string(),
        field: field.to_string(),
        value: Some(raw.to_string()),
        reason: "not a valid number",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn partial_document_keeps_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let config = load_from_str(r#"{ "mode": "preview", "matching": { "fuzzy_limit": 30 } }"#)?;
        assert_eq!(config.mode, ResolveMode::Preview);
        assert_eq!(config.matching.fuzzy_limit, 30);
        assert_eq!(config.matching.max_verified, 15);
        assert!(!config.catalog_only);
        Ok(())
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = load_from_str(r#"{ "matching": { "fuzy_limit": 30 } }"#).err();
        assert!(matches!(err, Some(ConfigError::Json { .. })));
    }

    #[test]
    fn overrides_replace_thresholds() -> Result<(), Box<dyn std::error::Error>> {
        let config = EngineConfig::default().apply_overrides(lookup(&[
            (ENV_MODE, "PREVIEW"),
            (ENV_AMBIGUITY_LIMIT, "10"),
            (ENV_SIMILARITY_MIN, "90.5"),
            (ENV_SIZE_TOLERANCE_PCT, "5"),
        ]))?;
        assert!(config.mode.is_preview());
        assert_eq!(config.matching.max_verified, 10);
        assert!((config.matching.similarity_min - 90.5).abs() < f64::EPSILON);
        assert_eq!(config.matching.size_tolerance_pct, 5);
        Ok(())
    }

    #[test]
    fn malformed_override_names_variable() {
        let err = EngineConfig::default()
            .apply_overrides(lookup(&[(ENV_SIZE_TOLERANCE_PCT, "ten")]))
            .err();
        match err {
            Some(ConfigError::InvalidField { section, value, .. }) => {
                assert_eq!(section, ENV_SIZE_TOLERANCE_PCT);
                assert_eq!(value.as_deref(), Some("ten"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn override_that_breaks_validation_is_rejected() {
        let result =
            EngineConfig::default().apply_overrides(lookup(&[(ENV_AMBIGUITY_LIMIT, "40")]));
        assert!(result.is_err());
    }
}
