//! Outcomes of a single evaluation, a catalog sweep and a pass.

use std::collections::BTreeMap;

use retitle_core::{CatalogId, CategoryId, ContentClass};
use serde::Serialize;

/// Result of evaluating one item. None of these is an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolveOutcome {
    /// The payload carried the obfuscation signature; nothing ran.
    Skipped,
    /// A catalog search returned too many records to verify.
    Ambiguous {
        /// Number of records returned.
        candidates: usize,
    },
    /// Every stage missed.
    NoMatch,
    /// The candidate equals the current title, ignoring case.
    Unchanged {
        /// Canonical candidate title.
        title: String,
        /// Catalog record linked by this evaluation, if any.
        linked: Option<CatalogId>,
    },
    /// A hash lookup missed.
    HashMiss {
        /// Attempts left after the decrement.
        remaining_attempts: i32,
    },
    /// The item received a new title.
    Renamed {
        /// Canonical title applied.
        title: String,
        /// Rule or catalog stage that produced it.
        method: String,
        /// Category determined for the title.
        category: CategoryId,
        /// Whether persistence was suppressed.
        preview: bool,
    },
    /// The item was already committed in this pass.
    Suppressed,
}

impl ResolveOutcome {
    /// Stable label used for metrics and pass reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Ambiguous { .. } => "ambiguous",
            Self::NoMatch => "no_match",
            Self::Unchanged { .. } => "unchanged",
            Self::HashMiss { .. } => "hash_miss",
            Self::Renamed { .. } => "renamed",
            Self::Suppressed => "suppressed",
        }
    }

    /// Whether a candidate was accepted, renamed or not.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Unchanged { .. } | Self::Renamed { .. })
    }
}

/// Result of a catalog fuzzy search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FuzzyMatch<T> {
    /// No record survived verification.
    NoMatch,
    /// Verified records, in search order.
    Matched(Vec<T>),
    /// Too many records to verify.
    Ambiguous {
        /// Number of records returned.
        count: usize,
    },
}

/// Result of sweeping items from one catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SweepOutcome {
    /// Items renamed or linked to the record.
    Matched {
        /// Items that now carry the record title.
        count: usize,
    },
    /// The token search returned too many items to trust.
    Ambiguous {
        /// Number of items returned.
        count: usize,
    },
    /// No item shared the record's tokens.
    NoMatch,
}

/// Summary of one pass over pending items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Content class of the pass.
    pub class: ContentClass,
    /// Items evaluated.
    pub checked: u64,
    /// Items renamed (or that would be, in preview mode).
    pub changed: u64,
    /// Items whose evaluation failed; the pass continued past them.
    pub errors: u64,
    /// Outcome counts keyed by [`ResolveOutcome::label`].
    pub outcomes: BTreeMap<&'static str, u64>,
}

impl PassReport {
    pub(crate) fn new(class: ContentClass) -> Self {
        Self {
            class,
            checked: 0,
            changed: 0,
            errors: 0,
            outcomes: BTreeMap::new(),
        }
    }

    pub(crate) fn record(&mut self, outcome: &ResolveOutcome) {
        *self.outcomes.entry(outcome.label()).or_default() += 1;
    }

    pub(crate) const fn record_error(&mut self) {
        self.errors += 1;
    }

    /// Count of outcomes with the given label.
    #[must_use]
    pub fn count(&self, label: &str) -> u64 {
        self.outcomes.get(label).copied().unwrap_or_default()
    }
}
