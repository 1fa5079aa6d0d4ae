//! Domain model and collaborator interfaces for release title resolution.

pub mod model;
pub mod service;

pub use model::{
    CandidateMatch, CatalogId, CatalogRecord, CategoryId, ContentClass, FingerprintPeer, GroupId,
    HashAlgorithm, Item, ItemId, PendingItem, ProcessState, ProcessedFlag, ProcessedFlags,
    RawText, Resolution,
};
pub use service::{CatalogStore, Categorizer, ItemSource, PersistenceSink, SearchIndex};
