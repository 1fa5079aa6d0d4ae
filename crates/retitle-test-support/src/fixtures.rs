//! Item and catalog record builders.

use std::collections::BTreeMap;

use retitle_core::{
    CatalogId, CatalogRecord, CategoryId, GroupId, HashAlgorithm, Item, ItemId, PendingItem,
    ProcessedFlags, RawText,
};
use uuid::Uuid;

/// Category assigned to fixture items before any rename.
pub const UNSORTED_CATEGORY: CategoryId = CategoryId(7_010);

/// Deterministic item identifier for fixture `n`.
#[must_use]
pub const fn item_id(n: u128) -> ItemId {
    Uuid::from_u128(n)
}

/// Item with the given posted name, used as its current title as well.
#[must_use]
pub fn item(n: u128, name: &str) -> Item {
    Item {
        id: item_id(n),
        name: name.to_string(),
        title: name.to_string(),
        category: UNSORTED_CATEGORY,
        group: GroupId(1),
        origin: String::new(),
        size: 0,
        processed: ProcessedFlags::default(),
        catalog_link: None,
        renamed: false,
        dehash_attempts: 3,
    }
}

/// Item with an explicit payload size.
#[must_use]
pub fn sized_item(n: u128, name: &str, size: u64) -> Item {
    Item {
        size,
        ..item(n, name)
    }
}

/// Pending entry pairing an item with a text body.
#[must_use]
pub fn pending(item: Item, text: &str) -> PendingItem {
    PendingItem {
        item,
        text: RawText::new(text),
        fingerprint: None,
    }
}

/// Pending entry pairing an item with listing entries.
#[must_use]
pub fn pending_listing(item: Item, entries: &[&str]) -> PendingItem {
    PendingItem {
        item,
        text: RawText::from_entries(entries),
        fingerprint: None,
    }
}

/// Pending entry carrying a media fingerprint and no text.
#[must_use]
pub fn pending_fingerprint(item: Item, fingerprint: &str) -> PendingItem {
    PendingItem {
        item,
        text: RawText::empty(),
        fingerprint: Some(fingerprint.to_string()),
    }
}

/// Catalog record with a title only.
#[must_use]
pub fn record(id: u64, title: &str) -> CatalogRecord {
    CatalogRecord {
        id: CatalogId(id),
        title: title.to_string(),
        source: "fixture".to_string(),
        filename: None,
        hashes: BTreeMap::new(),
    }
}

/// Catalog record with a known filename.
#[must_use]
pub fn record_with_filename(id: u64, title: &str, filename: &str) -> CatalogRecord {
    CatalogRecord {
        filename: Some(filename.to_string()),
        ..record(id, title)
    }
}

/// Catalog record with one content hash.
#[must_use]
pub fn record_with_hash(
    id: u64,
    title: &str,
    algorithm: HashAlgorithm,
    digest: &str,
) -> CatalogRecord {
    let mut base = record(id, title);
    base.hashes.insert(algorithm, digest.to_ascii_lowercase());
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_fill_expected_fields() {
        let sized = sized_item(2, "Some.Name-GRP", 1_000);
        assert_eq!(sized.id, item_id(2));
        assert_eq!(sized.title, "Some.Name-GRP");
        assert_eq!(sized.size, 1_000);

        let hashed = record_with_hash(9, "Title", HashAlgorithm::Md5, "ABCDEF");
        assert_eq!(
            hashed.hashes.get(&HashAlgorithm::Md5).map(String::as_str),
            Some("abcdef")
        );

        let listing = pending_listing(item(1, "x"), &["a.rar", "b.rar"]);
        assert_eq!(listing.text.entries().count(), 2);
    }
}
