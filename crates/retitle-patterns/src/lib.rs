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

//! Ordered pattern cascades and title helpers for release name resolution.
//!
//! Layout: `rules/` (rule descriptors and the per-family tables), `canon.rs`
//! (title canonicalization), `similarity.rs` (percent similarity), `filename.rs`
//! (listing entry normalisation).
//!
//! # Design
//! - [`PatternLibrary`] compiles every table once; evaluation is read-only and the
//!   library can be shared across threads.
//! - The first rule that yields a non-blank candidate wins; candidates are returned
//!   raw and canonicalized by the caller.

pub mod canon;
pub mod error;
pub mod filename;
pub mod rules;
pub mod similarity;

use regex::Regex;
use retitle_core::{CandidateMatch, ContentClass};

pub use canon::{
    Canonicalizer, DEFAULT_ABUSE_ORIGINS, MAX_TITLE_CHARS, SUBSTITUTE_GROUP_TAG, canonicalize,
    same_title, strip_short_extension, title_case_words,
};
pub use error::{PatternError, PatternResult};
pub use filename::{FilenameKey, normalize_filename};
pub use rules::{Extraction, Guard, PatternRule, RuleFamily, Synthesizer};
pub use similarity::similarity_percent;

use rules::tokens::{FILENAME_DATE, OBFUSCATED, PROVENANCE_LINE, SCENE_NAME};

/// Compiled rule tables plus the auxiliary expressions used by the resolver.
#[derive(Debug)]
pub struct PatternLibrary {
    rules: Vec<PatternRule>,
    scene_name: Regex,
    obfuscated: Regex,
    provenance_line: Regex,
    filename_date: Regex,
}

impl PatternLibrary {
    /// Compile every rule table.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::RegexCompile`] when an expression fails to compile.
    pub fn new() -> PatternResult<Self> {
        Ok(Self {
            rules: rules::all_rules()?,
            scene_name: rules::compile_exact("scene name", SCENE_NAME)?,
            obfuscated: rules::compile_exact("obfuscated body", OBFUSCATED)?,
            provenance_line: rules::compile("provenance line", PROVENANCE_LINE)?,
            filename_date: rules::compile_exact("filename date", FILENAME_DATE)?,
        })
    }

    /// Rules of one family, in priority order.
    pub fn rules(&self, family: RuleFamily) -> impl Iterator<Item = &PatternRule> {
        self.rules.iter().filter(move |rule| rule.family() == family)
    }

    /// First candidate produced by a family, labelled with the winning rule.
    #[must_use]
    pub fn extract(&self, family: RuleFamily, text: &str) -> Option<CandidateMatch> {
        self.rules(family).find_map(|rule| {
            rule.extract(text)
                .map(|title| CandidateMatch::extracted(title, rule.label()))
        })
    }

    /// Run the families registered for a content class, stopping at the first hit.
    #[must_use]
    pub fn cascade(&self, class: ContentClass, text: &str) -> Option<CandidateMatch> {
        RuleFamily::cascade_for(class)
            .iter()
            .find_map(|family| self.extract(*family, text))
    }

    /// Scene-shaped fragments of `text`, in order of appearance.
    pub fn scene_fragments<'t>(&self, text: &'t str) -> impl Iterator<Item = &'t str> {
        self.scene_name.find_iter(text).map(|m| m.as_str())
    }

    /// Whether `text` contains a scene-shaped release name.
    #[must_use]
    pub fn is_scene_shaped(&self, text: &str) -> bool {
        self.scene_name.is_match(text)
    }

    /// Whether an info-file body carries the obfuscation signature.
    #[must_use]
    pub fn is_obfuscated(&self, text: &str) -> bool {
        self.obfuscated.is_match(text)
    }

    /// Whether an info-file body carries a `Source :` provenance line.
    #[must_use]
    pub fn names_provenance(&self, text: &str) -> bool {
        self.provenance_line.is_match(text)
    }

    /// Normalise a listing entry and extract its date token and suffix.
    #[must_use]
    pub fn filename_key(&self, name: &str) -> Option<FilenameKey> {
        filename::extract_key(&self.filename_date, &normalize_filename(name))
    }
}
