#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! File and environment backed configuration for the resolution engine.
//!
//! Layout: `model.rs` (typed config sections and validation), `loader.rs` (JSON
//! loading and `RETITLE_*` overrides), `error.rs` (`ConfigError`).

pub mod error;
pub mod loader;
pub mod model;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    ENV_AMBIGUITY_LIMIT, ENV_MODE, ENV_SIMILARITY_MIN, ENV_SIZE_TOLERANCE_PCT, load_from_path,
    load_from_str,
};
pub use model::{CanonPolicy, EngineConfig, MatchThresholds, ResolveMode};
