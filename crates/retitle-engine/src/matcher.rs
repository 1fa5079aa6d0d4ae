//! Catalog cross-reference matching.
//!
//! # Design
//! - Each lookup kind returns an explicit optional or [`FuzzyMatch`] so "no row" and
//!   "too many rows" never collapse into one state.
//! - Cheap pre-checks (length, scene shape) run before any catalog query.
//! - Every lookup is counted in `catalog_lookups_total{kind,result}`.

use std::sync::Arc;

use retitle_config::MatchThresholds;
use retitle_core::{CatalogRecord, CatalogStore, FingerprintPeer, HashAlgorithm, Item};
use retitle_patterns::{PatternLibrary, same_title, similarity_percent};
use retitle_telemetry::Metrics;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::outcome::FuzzyMatch;

/// Shortest alphanumeric run used as a search token.
const MIN_TOKEN_CHARS: usize = 3;

/// Catalog lookups with configured thresholds.
#[derive(Clone)]
pub struct CatalogMatcher {
    catalog: Arc<dyn CatalogStore>,
    library: Arc<PatternLibrary>,
    thresholds: MatchThresholds,
    metrics: Metrics,
}

impl CatalogMatcher {
    /// Matcher over `catalog` using `library` for shape checks and filename keys.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        library: Arc<PatternLibrary>,
        thresholds: MatchThresholds,
        metrics: Metrics,
    ) -> Self {
        Self {
            catalog,
            library,
            thresholds,
            metrics,
        }
    }

    /// Thresholds in effect.
    #[must_use]
    pub const fn thresholds(&self) -> &MatchThresholds {
        &self.thresholds
    }

    /// Whether `title` is long enough and scene-shaped enough to query the catalog.
    #[must_use]
    pub fn worth_querying(&self, title: &str) -> bool {
        title.chars().count() >= self.thresholds.min_title_chars
            && self.library.is_scene_shaped(title)
    }

    /// Exact title lookup.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Collaborator`] when the catalog fails.
    pub fn match_exact(&self, title: &str) -> EngineResult<Option<CatalogRecord>> {
        if !self.worth_querying(title) {
            self.count("exact", "skipped");
            return Ok(None);
        }
        let record = self
            .catalog
            .find_by_title(title)
            .map_err(EngineError::collaborator("catalog.find_by_title", None))?;
        self.count("exact", hit_or_miss(record.is_some()));
        Ok(record)
    }

    /// Token search verified record by record.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Collaborator`] when the catalog fails.
    pub fn match_fuzzy_text(&self, title: &str) -> EngineResult<FuzzyMatch<CatalogRecord>> {
        if !self.worth_querying(title) {
            self.count("fuzzy", "skipped");
            return Ok(FuzzyMatch::NoMatch);
        }
        let tokens = search_tokens(title);
        if tokens.is_empty() {
            self.count("fuzzy", "skipped");
            return Ok(FuzzyMatch::NoMatch);
        }
        let records = self
            .catalog
            .search_tokens(&tokens, self.thresholds.fuzzy_limit)
            .map_err(EngineError::collaborator("catalog.search_tokens", None))?;
        let outcome = self.verify(records, |record| same_title(&record.title, title));
        self.count(
            "fuzzy",
            match &outcome {
                FuzzyMatch::NoMatch => "miss",
                FuzzyMatch::Matched(_) => "hit",
                FuzzyMatch::Ambiguous { .. } => "ambiguous",
            },
        );
        Ok(outcome)
    }

    /// Apply the ambiguity threshold to a search result, then keep rows accepted by
    /// `verified`.
    pub(crate) fn verify<T>(&self, rows: Vec<T>, verified: impl Fn(&T) -> bool) -> FuzzyMatch<T> {
        if rows.is_empty() {
            return FuzzyMatch::NoMatch;
        }
        if rows.len() > self.thresholds.max_verified {
            return FuzzyMatch::Ambiguous { count: rows.len() };
        }
        let kept: Vec<T> = rows.into_iter().filter(|row| verified(row)).collect();
        if kept.is_empty() {
            FuzzyMatch::NoMatch
        } else {
            FuzzyMatch::Matched(kept)
        }
    }

    /// Hash lookup routed by digest length.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] for digests that are not 32 or 40 hex
    /// characters and [`EngineError::Collaborator`] when the catalog fails.
    pub fn match_hash(&self, digest: &str) -> EngineResult<(HashAlgorithm, Option<CatalogRecord>)> {
        let digest = digest.trim();
        let algorithm =
            HashAlgorithm::from_digest(digest).ok_or_else(|| EngineError::InvalidInput {
                field: "digest",
                value: digest.to_string(),
                reason: "expected 32 or 40 hex characters",
            })?;
        let record = self
            .catalog
            .find_by_hash(algorithm, &digest.to_ascii_lowercase())
            .map_err(EngineError::collaborator("catalog.find_by_hash", None))?;
        self.count("hash", hit_or_miss(record.is_some()));
        Ok((algorithm, record))
    }

    /// Filename lookup over listing entries, longest entry first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Collaborator`] when the catalog fails.
    pub fn match_filename<'a, I>(&self, filenames: I) -> EngineResult<Option<CatalogRecord>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut ordered: Vec<&str> = filenames.into_iter().collect();
        ordered.sort_by_key(|name| std::cmp::Reverse(name.len()));

        for name in ordered {
            let Some(key) = self.library.filename_key(name) else {
                continue;
            };
            let records = self
                .catalog
                .find_by_filename_token(&key.token)
                .map_err(EngineError::collaborator("catalog.find_by_filename_token", None))?;
            let accepted = records.into_iter().find(|record| {
                record
                    .filename
                    .as_deref()
                    .and_then(|filename| self.library.filename_key(filename))
                    .is_some_and(|other| {
                        other.token == key.token
                            && similarity_percent(&key.suffix, &other.suffix)
                                >= self.thresholds.similarity_min
                    })
            });
            if let Some(record) = accepted {
                debug!(filename = name, catalog_id = %record.id, "filename matched catalog");
                self.count("filename", "hit");
                return Ok(Some(record));
            }
        }
        self.count("filename", "miss");
        Ok(None)
    }

    /// First peer sharing `fingerprint` that has provenance (a catalog link or an
    /// external source) and whose size is within tolerance of `item`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Collaborator`] when the catalog fails.
    pub fn match_fingerprint(
        &self,
        fingerprint: &str,
        item: &Item,
    ) -> EngineResult<Option<FingerprintPeer>> {
        let peers = self
            .catalog
            .fingerprint_peers(fingerprint, item.id)
            .map_err(EngineError::collaborator(
                "catalog.fingerprint_peers",
                Some(item.id),
            ))?;
        let tolerance = self.thresholds.size_tolerance_pct;
        let accepted = peers.into_iter().find(|peer| {
            peer.has_provenance()
                && size_difference_pct(item.size, peer.size)
                    .is_some_and(|difference| (-tolerance..=tolerance).contains(&difference))
        });
        self.count("fingerprint", hit_or_miss(accepted.is_some()));
        Ok(accepted)
    }

    fn count(&self, kind: &str, result: &str) {
        self.metrics.inc_catalog_lookup(kind, result);
    }
}

const fn hit_or_miss(hit: bool) -> &'static str {
    if hit { "hit" } else { "miss" }
}

/// Alphanumeric runs of at least three characters, in order.
#[must_use]
pub fn search_tokens(title: &str) -> Vec<String> {
    title
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|token| token.len() >= MIN_TOKEN_CHARS)
        .map(ToString::to_string)
        .collect()
}

/// `round((other - own) / other * 100)`, or `None` when the peer size is zero.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn size_difference_pct(own: u64, other: u64) -> Option<i64> {
    if other == 0 {
        return None;
    }
    let own = own as f64;
    let other = other as f64;
    Some(((other - own) / other * 100.0).round() as i64)
}
