use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sequential identifier stamped on each published event, starting at 1.
pub type EventId = u64;

/// Discriminator of an [`Event`], usable as a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`Event::ItemRenamed`]
    ItemRenamed,
    /// [`Event::CatalogLinked`]
    CatalogLinked,
    /// [`Event::AmbiguousMatch`]
    AmbiguousMatch,
    /// [`Event::DehashMiss`]
    DehashMiss,
    /// [`Event::PassCompleted`]
    PassCompleted,
}

impl EventKind {
    /// Snake-case label, identical to the serialized `type` tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ItemRenamed => "item_renamed",
            Self::CatalogLinked => "catalog_linked",
            Self::AmbiguousMatch => "ambiguous_match",
            Self::DehashMiss => "dehash_miss",
            Self::PassCompleted => "pass_completed",
        }
    }
}

/// Typed domain events emitted by the resolver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// An item received a new title (or would have, in preview mode).
    ItemRenamed {
        /// Item identifier.
        item_id: Uuid,
        /// Content class label of the evaluation.
        class: String,
        /// Title before the rename.
        old_title: String,
        /// Canonical title applied.
        new_title: String,
        /// Rule or catalog stage that produced the title.
        method: String,
        /// Whether persistence was suppressed.
        preview: bool,
    },
    /// An item was linked to a catalog record without a title change.
    CatalogLinked {
        /// Item identifier.
        item_id: Uuid,
        /// Catalog record identifier.
        catalog_id: u64,
    },
    /// A catalog lookup returned too many records to verify.
    AmbiguousMatch {
        /// Item under evaluation, absent for catalog sweeps.
        item_id: Option<Uuid>,
        /// Content class label of the evaluation.
        class: String,
        /// Number of candidate records returned.
        candidates: usize,
    },
    /// A hash lookup missed and the dehash budget was decremented.
    DehashMiss {
        /// Item identifier.
        item_id: Uuid,
        /// Attempts left after the decrement.
        remaining_attempts: i32,
    },
    /// A pass over pending items finished.
    PassCompleted {
        /// Content class label of the pass.
        class: String,
        /// Items evaluated.
        checked: u64,
        /// Items renamed.
        changed: u64,
        /// Items whose evaluation failed.
        errors: u64,
    },
}

impl Event {
    /// Discriminator of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ItemRenamed { .. } => EventKind::ItemRenamed,
            Self::CatalogLinked { .. } => EventKind::CatalogLinked,
            Self::AmbiguousMatch { .. } => EventKind::AmbiguousMatch,
            Self::DehashMiss { .. } => EventKind::DehashMiss,
            Self::PassCompleted { .. } => EventKind::PassCompleted,
        }
    }

    /// Item the event concerns. Sweeps and pass summaries carry none.
    #[must_use]
    pub const fn item_id(&self) -> Option<Uuid> {
        match self {
            Self::ItemRenamed { item_id, .. }
            | Self::CatalogLinked { item_id, .. }
            | Self::DehashMiss { item_id, .. } => Some(*item_id),
            Self::AmbiguousMatch { item_id, .. } => *item_id,
            Self::PassCompleted { .. } => None,
        }
    }
}

/// Published event together with its journal identifier and emission time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventEnvelope {
    /// Sequential identifier.
    pub id: EventId,
    /// Emission time.
    pub timestamp: DateTime<Utc>,
    /// Event payload.
    pub event: Event,
}
