//! Error types for pattern library construction.

use thiserror::Error;

/// Errors raised while compiling the pattern library.
#[derive(Debug, Error)]
pub enum PatternError {
    /// A rule expression failed to compile.
    #[error("failed to compile pattern rule")]
    RegexCompile {
        /// Label of the rule or probe being compiled.
        label: &'static str,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

/// Result alias for pattern library operations.
pub type PatternResult<T> = Result<T, PatternError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn regex_compile_error_exposes_source() {
        let err = PatternError::RegexCompile {
            label: "tv: broken",
            source: regex::Error::Syntax("bad regex".to_string()),
        };
        assert_eq!(err.to_string(), "failed to compile pattern rule");
        assert!(err.source().is_some());
    }
}
