//! Per-pass evaluation state.

use retitle_core::ItemId;

/// State threaded through every evaluation of a pass.
///
/// `matched` is reset at the start of each item and set by the first commit, after
/// which further candidates for the same evaluation are suppressed. Counters persist
/// until [`RunState::reset_counters`] is called.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    /// Item that received the most recent commit.
    pub last_committed: Option<ItemId>,
    /// Whether the current evaluation already committed a candidate.
    pub matched: bool,
    /// Items evaluated.
    pub checked: u64,
    /// Items whose title changed (or would have, in preview mode).
    pub changed: u64,
    /// Evaluations that ended ambiguous.
    pub ambiguous: u64,
    /// Evaluations skipped without running any stage.
    pub skipped: u64,
}

impl RunState {
    /// Fresh state for a new pass.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare for the next item.
    pub const fn begin_item(&mut self) {
        self.matched = false;
        self.checked += 1;
    }

    /// Whether `item_id` already received a commit in this pass.
    #[must_use]
    pub fn committed(&self, item_id: ItemId) -> bool {
        self.last_committed == Some(item_id)
    }

    /// Record a commit for `item_id`.
    pub const fn record_commit(&mut self, item_id: ItemId) {
        self.matched = true;
        self.last_committed = Some(item_id);
    }

    /// Zero the counters, keeping the idempotency guard.
    pub const fn reset_counters(&mut self) {
        self.checked = 0;
        self.changed = 0;
        self.ambiguous = 0;
        self.skipped = 0;
    }
}
