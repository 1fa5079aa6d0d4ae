//! In-memory collaborators for resolver tests.
//!
//! Every fake records the calls it receives so tests can assert on side effects,
//! and can be switched into a failing mode to exercise error propagation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::bail;
use retitle_core::{
    CatalogId, CatalogRecord, CatalogStore, Categorizer, CategoryId, ContentClass,
    FingerprintPeer, GroupId, HashAlgorithm, Item, ItemId, ItemSource, PendingItem,
    PersistenceSink, ProcessedFlag, Resolution, SearchIndex,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn contains_all(haystack: &str, tokens: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    tokens
        .iter()
        .all(|token| haystack.contains(&token.to_lowercase()))
}

/// Pending items grouped by content class, plus a searchable item list.
#[derive(Debug, Default)]
pub struct InMemoryItems {
    pending: Mutex<Vec<(ContentClass, PendingItem)>>,
    items: Mutex<Vec<Item>>,
}

impl InMemoryItems {
    /// Empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `entry` for passes over `class`.
    #[must_use]
    pub fn with_pending(self, class: ContentClass, entry: PendingItem) -> Self {
        lock(&self.pending).push((class, entry));
        self
    }

    /// Make `item` visible to token searches.
    #[must_use]
    pub fn with_item(self, item: Item) -> Self {
        lock(&self.items).push(item);
        self
    }
}

impl ItemSource for InMemoryItems {
    fn pending(&self, class: ContentClass) -> anyhow::Result<Vec<PendingItem>> {
        Ok(lock(&self.pending)
            .iter()
            .filter(|(queued, _)| *queued == class)
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    fn search_items(&self, tokens: &[String], limit: usize) -> anyhow::Result<Vec<Item>> {
        Ok(lock(&self.items)
            .iter()
            .filter(|item| contains_all(&item.name, tokens) || contains_all(&item.title, tokens))
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Catalog backed by a record list and fingerprint peer table.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    records: Vec<CatalogRecord>,
    peers: HashMap<String, Vec<FingerprintPeer>>,
    queries: AtomicUsize,
    hash_lookups: Mutex<Vec<HashAlgorithm>>,
    failing: AtomicBool,
}

impl InMemoryCatalog {
    /// Catalog holding `records`.
    #[must_use]
    pub fn new(records: Vec<CatalogRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Register items sharing `fingerprint`.
    #[must_use]
    pub fn with_peers(mut self, fingerprint: &str, peers: Vec<FingerprintPeer>) -> Self {
        self.peers.insert(fingerprint.to_string(), peers);
        self
    }

    /// Make every lookup fail.
    #[must_use]
    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    /// Number of lookups received so far.
    #[must_use]
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Algorithms used by hash lookups, in call order.
    #[must_use]
    pub fn hash_lookups(&self) -> Vec<HashAlgorithm> {
        lock(&self.hash_lookups).clone()
    }

    fn record_query(&self) -> anyhow::Result<()> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            bail!("catalog unavailable");
        }
        Ok(())
    }
}

impl CatalogStore for InMemoryCatalog {
    fn find_by_title(&self, title: &str) -> anyhow::Result<Option<CatalogRecord>> {
        self.record_query()?;
        Ok(self
            .records
            .iter()
            .find(|record| record.title.eq_ignore_ascii_case(title))
            .cloned())
    }

    fn search_tokens(
        &self,
        tokens: &[String],
        limit: usize,
    ) -> anyhow::Result<Vec<CatalogRecord>> {
        self.record_query()?;
        Ok(self
            .records
            .iter()
            .filter(|record| {
                contains_all(&record.title, tokens)
                    || record
                        .filename
                        .as_deref()
                        .is_some_and(|filename| contains_all(filename, tokens))
            })
            .take(limit)
            .cloned()
            .collect())
    }

    fn find_by_hash(
        &self,
        algorithm: HashAlgorithm,
        digest: &str,
    ) -> anyhow::Result<Option<CatalogRecord>> {
        self.record_query()?;
        lock(&self.hash_lookups).push(algorithm);
        let digest = digest.to_ascii_lowercase();
        Ok(self
            .records
            .iter()
            .find(|record| record.hashes.get(&algorithm) == Some(&digest))
            .cloned())
    }

    fn find_by_filename_token(&self, token: &str) -> anyhow::Result<Vec<CatalogRecord>> {
        self.record_query()?;
        Ok(self
            .records
            .iter()
            .filter(|record| {
                record
                    .filename
                    .as_deref()
                    .is_some_and(|filename| filename.contains(token))
            })
            .cloned()
            .collect())
    }

    fn fingerprint_peers(
        &self,
        fingerprint: &str,
        exclude: ItemId,
    ) -> anyhow::Result<Vec<FingerprintPeer>> {
        self.record_query()?;
        Ok(self
            .peers
            .get(fingerprint)
            .map(|peers| {
                peers
                    .iter()
                    .filter(|peer| peer.item_id != exclude)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Categorizer returning one fixed category.
#[derive(Debug)]
pub struct FixedCategorizer {
    category: CategoryId,
    calls: AtomicUsize,
}

impl FixedCategorizer {
    /// Categorizer always answering `category`.
    #[must_use]
    pub const fn new(category: CategoryId) -> Self {
        Self {
            category,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of categorization requests received.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Categorizer for FixedCategorizer {
    fn determine_category(
        &self,
        _group: GroupId,
        _title: &str,
        _origin: &str,
    ) -> anyhow::Result<CategoryId> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.category)
    }
}

/// Side effect observed by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    /// Full-row title update.
    Applied(Resolution),
    /// Catalog link without a title change.
    Linked {
        /// Item updated.
        item_id: ItemId,
        /// Linked record.
        catalog_id: CatalogId,
    },
    /// Processed flag marked done.
    Processed {
        /// Item updated.
        item_id: ItemId,
        /// Flag marked.
        flag: ProcessedFlag,
    },
    /// Dehash attempt budget written.
    DehashAttempts {
        /// Item updated.
        item_id: ItemId,
        /// Attempts remaining.
        remaining: i32,
    },
}

/// Persistence sink recording every call in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    failing: AtomicBool,
}

impl RecordingSink {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail.
    #[must_use]
    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    /// Calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<SinkCall> {
        lock(&self.calls).clone()
    }

    /// Title updates received so far.
    #[must_use]
    pub fn resolutions(&self) -> Vec<Resolution> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                SinkCall::Applied(resolution) => Some(resolution.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: SinkCall) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("store unavailable");
        }
        lock(&self.calls).push(call);
        Ok(())
    }
}

impl PersistenceSink for RecordingSink {
    fn apply_resolution(&self, resolution: &Resolution) -> anyhow::Result<()> {
        self.record(SinkCall::Applied(resolution.clone()))
    }

    fn link_catalog(&self, item_id: ItemId, catalog_id: CatalogId) -> anyhow::Result<()> {
        self.record(SinkCall::Linked {
            item_id,
            catalog_id,
        })
    }

    fn mark_processed(&self, item_id: ItemId, flag: ProcessedFlag) -> anyhow::Result<()> {
        self.record(SinkCall::Processed { item_id, flag })
    }

    fn set_dehash_attempts(&self, item_id: ItemId, remaining: i32) -> anyhow::Result<()> {
        self.record(SinkCall::DehashAttempts { item_id, remaining })
    }
}

/// Search index recording reindex requests.
#[derive(Debug, Default)]
pub struct RecordingIndex {
    reindexed: Mutex<Vec<ItemId>>,
    failing: AtomicBool,
}

impl RecordingIndex {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every reindex request fail after being recorded.
    #[must_use]
    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    /// Items reindexed so far.
    #[must_use]
    pub fn reindexed(&self) -> Vec<ItemId> {
        lock(&self.reindexed).clone()
    }
}

impl SearchIndex for RecordingIndex {
    fn reindex(&self, item_id: ItemId) -> anyhow::Result<()> {
        lock(&self.reindexed).push(item_id);
        if self.failing.load(Ordering::SeqCst) {
            bail!("index unavailable");
        }
        Ok(())
    }
}
