//! Collaborator traits implemented by storage, catalog and index adapters.

use crate::model::{
    CatalogId, CatalogRecord, CategoryId, ContentClass, FingerprintPeer, GroupId, HashAlgorithm,
    Item, ItemId, PendingItem, ProcessedFlag, Resolution,
};
use anyhow::bail;

/// Supplies items awaiting evaluation.
pub trait ItemSource: Send + Sync {
    /// Items (with decoded raw text) pending evaluation for a content class.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be queried.
    fn pending(&self, class: ContentClass) -> anyhow::Result<Vec<PendingItem>>;

    /// Items whose title or name contains every token, used by the catalog sweep.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be queried; the default
    /// implementation reports lack of support.
    fn search_items(&self, tokens: &[String], limit: usize) -> anyhow::Result<Vec<Item>> {
        let _ = (tokens, limit);
        bail!("item search not supported by this source");
    }
}

/// Read-only access to the curated catalog.
pub trait CatalogStore: Send + Sync {
    /// Record whose title equals `title` exactly.
    ///
    /// # Errors
    ///
    /// Returns an error when the catalog cannot be queried.
    fn find_by_title(&self, title: &str) -> anyhow::Result<Option<CatalogRecord>>;

    /// Records whose title or filename contains every token, capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns an error when the catalog cannot be queried.
    fn search_tokens(&self, tokens: &[String], limit: usize)
    -> anyhow::Result<Vec<CatalogRecord>>;

    /// Record carrying the given lower-case hex digest.
    ///
    /// # Errors
    ///
    /// Returns an error when the catalog cannot be queried.
    fn find_by_hash(
        &self,
        algorithm: HashAlgorithm,
        digest: &str,
    ) -> anyhow::Result<Option<CatalogRecord>>;

    /// Records whose filename contains the given date token.
    ///
    /// # Errors
    ///
    /// Returns an error when the catalog cannot be queried.
    fn find_by_filename_token(&self, token: &str) -> anyhow::Result<Vec<CatalogRecord>>;

    /// Other items sharing a media fingerprint that already carry provenance.
    ///
    /// # Errors
    ///
    /// Returns an error when the catalog cannot be queried; the default
    /// implementation reports lack of support.
    fn fingerprint_peers(
        &self,
        fingerprint: &str,
        exclude: ItemId,
    ) -> anyhow::Result<Vec<FingerprintPeer>> {
        let _ = (fingerprint, exclude);
        bail!("fingerprint lookups not supported by this catalog");
    }
}

/// Assigns a category to a proposed title.
pub trait Categorizer: Send + Sync {
    /// Category for `title` posted to `group` by `origin`.
    ///
    /// # Errors
    ///
    /// Returns an error when categorization rules cannot be evaluated.
    fn determine_category(
        &self,
        group: GroupId,
        title: &str,
        origin: &str,
    ) -> anyhow::Result<CategoryId>;
}

/// Durable writes requested by the commit protocol.
pub trait PersistenceSink: Send + Sync {
    /// Apply a rename atomically (title, category, processed flag and link together).
    ///
    /// # Errors
    ///
    /// Returns an error when the update cannot be persisted.
    fn apply_resolution(&self, resolution: &Resolution) -> anyhow::Result<()>;

    /// Record a catalog link without renaming.
    ///
    /// # Errors
    ///
    /// Returns an error when the link cannot be persisted.
    fn link_catalog(&self, item_id: ItemId, catalog_id: CatalogId) -> anyhow::Result<()>;

    /// Mark a content class as evaluated for an item.
    ///
    /// # Errors
    ///
    /// Returns an error when the flag cannot be persisted.
    fn mark_processed(&self, item_id: ItemId, flag: ProcessedFlag) -> anyhow::Result<()>;

    /// Store the remaining hash lookup attempts for an item.
    ///
    /// # Errors
    ///
    /// Returns an error when the counter cannot be persisted.
    fn set_dehash_attempts(&self, item_id: ItemId, remaining: i32) -> anyhow::Result<()>;
}

/// Search index kept in sync with renamed items.
pub trait SearchIndex: Send + Sync {
    /// Request reindexing of an item. Failures are logged by the caller and never
    /// abort a rename.
    ///
    /// # Errors
    ///
    /// Returns an error when the index rejects the request.
    fn reindex(&self, item_id: ItemId) -> anyhow::Result<()>;
}
