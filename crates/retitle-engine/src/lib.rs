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

//! Release title resolution: catalog matching, heuristic cascades and the commit
//! protocol that persists the winning title.
//!
//! Layout: `matcher.rs` (catalog lookups and thresholds), `resolver.rs` (stage
//! orchestration and persistence), `context.rs` (per-pass state), `outcome.rs`
//! (evaluation results), `error.rs`.

pub mod context;
pub mod error;
pub mod matcher;
pub mod outcome;
pub mod resolver;

pub use context::RunState;
pub use error::{EngineError, EngineResult};
pub use matcher::{CatalogMatcher, search_tokens};
pub use outcome::{FuzzyMatch, PassReport, ResolveOutcome, SweepOutcome};
pub use resolver::{Collaborators, Resolver};
