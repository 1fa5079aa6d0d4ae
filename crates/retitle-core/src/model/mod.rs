//! Core release-title domain types shared across the workspace.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an item in the external store.
pub type ItemId = Uuid;

/// Identifier of a category assigned by the external categorizer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CategoryId(pub u32);

/// Identifier of the posting group (source) an item was collected from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct GroupId(pub u32);

/// Identifier of a record in the curated catalog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CatalogId(pub u64);

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-class processing state of an item.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// The class has not been evaluated yet.
    #[default]
    Unprocessed,
    /// A completed pass evaluated the class.
    Done,
}

impl ProcessState {
    /// Whether the class has already been evaluated.
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Processed-flag column touched by a content class.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProcessedFlag {
    /// Info-file evaluation.
    Nfo,
    /// File-listing evaluation.
    Files,
    /// Redundancy-file listing evaluation.
    Par2,
    /// Media fingerprint evaluation.
    Uid,
}

impl ProcessedFlag {
    /// Column name used by persistence adapters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nfo => "proc_nfo",
            Self::Files => "proc_files",
            Self::Par2 => "proc_par2",
            Self::Uid => "proc_uid",
        }
    }
}

/// Processing flags tracked for each content class.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessedFlags {
    /// Info-file pass state.
    pub nfo: ProcessState,
    /// File-listing pass state.
    pub files: ProcessState,
    /// Redundancy-file pass state.
    pub par2: ProcessState,
    /// Fingerprint pass state.
    pub uid: ProcessState,
}

impl ProcessedFlags {
    /// Read the state of a single flag.
    #[must_use]
    pub const fn get(&self, flag: ProcessedFlag) -> ProcessState {
        match flag {
            ProcessedFlag::Nfo => self.nfo,
            ProcessedFlag::Files => self.files,
            ProcessedFlag::Par2 => self.par2,
            ProcessedFlag::Uid => self.uid,
        }
    }

    /// Mark a flag as done. Flags never move back to unprocessed here.
    pub fn mark_done(&mut self, flag: ProcessedFlag) {
        match flag {
            ProcessedFlag::Nfo => self.nfo = ProcessState::Done,
            ProcessedFlag::Files => self.files = ProcessState::Done,
            ProcessedFlag::Par2 => self.par2 = ProcessState::Done,
            ProcessedFlag::Uid => self.uid = ProcessState::Done,
        }
    }
}

/// Digest algorithm of a catalog content hash.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// 128-bit digest, 32 hex characters.
    Md5,
    /// 160-bit digest, 40 hex characters.
    Sha1,
}

impl HashAlgorithm {
    /// Infer the algorithm from a hex digest. Returns `None` for any length other
    /// than 32 or 40 and for non-hex input.
    #[must_use]
    pub fn from_digest(digest: &str) -> Option<Self> {
        if !digest.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return None;
        }
        match digest.len() {
            32 => Some(Self::Md5),
            40 => Some(Self::Sha1),
            _ => None,
        }
    }

    /// Upper-case label used in method strings and metrics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA1",
        }
    }
}

/// Evaluation pass an item is going through.
///
/// Each class owns at most one processed-flag column; persistence is derived from the
/// variant, never from free-text method labels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentClass {
    /// Posted name checked with the TV, movie, game and application cascades.
    ReleaseName,
    /// Embedded info-file body.
    InfoFile,
    /// File-listing entries.
    FileName,
    /// Redundancy-file (PAR2) listing entries.
    Par2,
    /// Media fingerprint shared with other items.
    Fingerprint,
    /// Content hash lookup.
    Hash {
        /// Algorithm inferred from the digest length.
        algorithm: HashAlgorithm,
    },
    /// Catalog title swept against item names.
    CatalogTitle,
    /// Catalog filename matched against item file listings.
    CatalogFile,
}

impl ContentClass {
    /// Processed-flag column this class marks when a pass completes.
    #[must_use]
    pub const fn processed_flag(self) -> Option<ProcessedFlag> {
        match self {
            Self::InfoFile => Some(ProcessedFlag::Nfo),
            Self::FileName | Self::CatalogFile => Some(ProcessedFlag::Files),
            Self::Par2 => Some(ProcessedFlag::Par2),
            Self::Fingerprint => Some(ProcessedFlag::Uid),
            Self::ReleaseName | Self::Hash { .. } | Self::CatalogTitle => None,
        }
    }

    /// Whether a successful commit also settles the item's dehash status.
    #[must_use]
    pub const fn settles_dehash(self) -> bool {
        matches!(self, Self::Hash { .. })
    }

    /// Short label used in logs, metrics and method strings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ReleaseName => "release_name",
            Self::InfoFile => "nfo",
            Self::FileName => "filenames",
            Self::Par2 => "par2",
            Self::Fingerprint => "uid",
            Self::Hash {
                algorithm: HashAlgorithm::Md5,
            } => "md5",
            Self::Hash {
                algorithm: HashAlgorithm::Sha1,
            } => "sha1",
            Self::CatalogTitle => "catalog_title",
            Self::CatalogFile => "catalog_file",
        }
    }
}

impl fmt::Display for ContentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The entity being renamed. Owned by the external store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    /// Stable identifier.
    pub id: ItemId,
    /// Name as originally posted.
    pub name: String,
    /// Current searchable title.
    pub title: String,
    /// Current category.
    pub category: CategoryId,
    /// Posting group the item came from.
    pub group: GroupId,
    /// Uploader tag; empty when unknown.
    #[serde(default)]
    pub origin: String,
    /// Total payload size in bytes.
    pub size: u64,
    /// Per-class processing flags.
    #[serde(default)]
    pub processed: ProcessedFlags,
    /// Catalog record the item is linked to, if any.
    #[serde(default)]
    pub catalog_link: Option<CatalogId>,
    /// Whether the item has been renamed at least once.
    #[serde(default)]
    pub renamed: bool,
    /// Remaining hash lookup attempts before external policy stops retrying.
    #[serde(default)]
    pub dehash_attempts: i32,
}

/// Transient text payload evaluated for one item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct RawText(String);

impl RawText {
    /// Wrap an already decoded body.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    /// Join listing entries with newlines.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = entries
            .into_iter()
            .map(|entry| entry.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Self(joined)
    }

    /// Payload used by fingerprint-only passes.
    #[must_use]
    pub const fn empty() -> Self {
        Self(String::new())
    }

    /// Full body.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the payload carries no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Non-empty listing entries, one per line.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.0
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}

/// Immutable reference entry from the curated catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogRecord {
    /// Identifier of the record.
    pub id: CatalogId,
    /// Canonical title.
    pub title: String,
    /// Provenance label.
    pub source: String,
    /// Known filename, if the catalog tracks one.
    #[serde(default)]
    pub filename: Option<String>,
    /// Content hashes keyed by algorithm (lower-case hex).
    #[serde(default)]
    pub hashes: BTreeMap<HashAlgorithm, String>,
}

/// Ephemeral result of one evaluation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMatch {
    /// Proposed title before canonicalization.
    pub title: String,
    /// Label of the rule or lookup that produced the candidate.
    pub method: String,
    /// Catalog record backing the candidate, if any.
    pub catalog_link: Option<CatalogId>,
}

impl CandidateMatch {
    /// Candidate produced by a text extractor.
    #[must_use]
    pub fn extracted(title: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            method: method.into(),
            catalog_link: None,
        }
    }

    /// Candidate backed by a catalog record.
    #[must_use]
    pub fn from_catalog(record: &CatalogRecord, method: impl Into<String>) -> Self {
        Self {
            title: record.title.clone(),
            method: method.into(),
            catalog_link: Some(record.id),
        }
    }
}

/// Another item sharing a media fingerprint with the item under evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FingerprintPeer {
    /// Identifier of the peer item.
    pub item_id: ItemId,
    /// Current title of the peer.
    pub title: String,
    /// Peer payload size in bytes.
    pub size: u64,
    /// Catalog record the peer is linked to, if any.
    pub catalog_link: Option<CatalogId>,
    /// Title vouched for outside the catalog, e.g. by an anime database link or a
    /// trusted non-scene uploader.
    #[serde(default)]
    pub external_provenance: bool,
}

impl FingerprintPeer {
    /// Whether the peer's title can be adopted: it is catalog-linked or carries
    /// external provenance.
    #[must_use]
    pub const fn has_provenance(&self) -> bool {
        self.catalog_link.is_some() || self.external_provenance
    }
}

/// Item paired with the raw text it should be evaluated against.
#[derive(Debug, Clone)]
pub struct PendingItem {
    /// Item snapshot.
    pub item: Item,
    /// Decoded payload for the pass.
    pub text: RawText,
    /// Fingerprint digest, for fingerprint passes.
    pub fingerprint: Option<String>,
}

/// Atomic full-row update requested by the commit protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Item being updated.
    pub item_id: ItemId,
    /// New canonical title.
    pub title: String,
    /// Category determined for the new title.
    pub category: CategoryId,
    /// Processed flag to mark done alongside the rename.
    pub processed: Option<ProcessedFlag>,
    /// Whether the dehash status is settled by this update.
    pub dehash_settled: bool,
    /// Catalog link to record, if the candidate came from the catalog.
    pub catalog_link: Option<CatalogId>,
    /// Method label that produced the title.
    pub method: String,
}
