//! Rule descriptors and the ordered rule tables for every family.
//!
//! # Design
//! - Priority order is data: each family is a `Vec` evaluated front to back.
//! - A rule is a compiled pattern, an optional guard over the whole text and an
//!   extraction turning the captures into a raw candidate title.
//! - Expressions avoid lookaround; guards and capture groups carry those constraints.

mod file;
mod info;
mod release;
pub(crate) mod tokens;

use std::fmt;

use regex::{Captures, Regex, RegexBuilder};
use retitle_core::ContentClass;

use crate::error::{PatternError, PatternResult};

/// Compiled size ceiling; the codec and language alternations are large once Unicode
/// word classes are expanded.
const REGEX_SIZE_LIMIT: usize = 1 << 25;

/// Ordered rule family; each content class runs one or more families in sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleFamily {
    /// Season/episode shaped names and sports broadcasts.
    Tv,
    /// Year, resolution and codec permutations.
    Movie,
    /// Platform, region and group-suffix game names.
    Game,
    /// Application installers.
    App,
    /// Info-file lines naming an episode.
    NfoTv,
    /// Info-file lines naming a movie.
    NfoMovie,
    /// Info-file FM radio captures.
    NfoMusic,
    /// Info-file `Title (Year)` synthesis.
    NfoTitleYear,
    /// Info-file game releases, gated on group signatures.
    NfoGame,
    /// Info-file supplier signatures.
    NfoMisc,
    /// File listing entries.
    File,
}

const RELEASE_NAME_FAMILIES: &[RuleFamily] =
    &[RuleFamily::Tv, RuleFamily::Movie, RuleFamily::Game, RuleFamily::App];
const INFO_FILE_FAMILIES: &[RuleFamily] = &[
    RuleFamily::NfoTv,
    RuleFamily::NfoMovie,
    RuleFamily::NfoMusic,
    RuleFamily::NfoTitleYear,
    RuleFamily::NfoGame,
    RuleFamily::NfoMisc,
];
const FILE_FAMILIES: &[RuleFamily] = &[RuleFamily::File];

impl RuleFamily {
    /// Families run, in order, for a content class. Catalog-only classes run none.
    #[must_use]
    pub const fn cascade_for(class: ContentClass) -> &'static [Self] {
        match class {
            ContentClass::ReleaseName => RELEASE_NAME_FAMILIES,
            ContentClass::InfoFile => INFO_FILE_FAMILIES,
            ContentClass::FileName | ContentClass::Par2 => FILE_FAMILIES,
            ContentClass::Fingerprint
            | ContentClass::Hash { .. }
            | ContentClass::CatalogTitle
            | ContentClass::CatalogFile => &[],
        }
    }

    /// Label prefix recorded with candidates from this family.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tv => "tv",
            Self::Movie => "movie",
            Self::Game => "game",
            Self::App => "app",
            Self::NfoTv
            | Self::NfoMovie
            | Self::NfoMusic
            | Self::NfoTitleYear
            | Self::NfoGame
            | Self::NfoMisc => "nfo",
            Self::File => "file",
        }
    }
}

/// Whole-text precondition evaluated before a rule's pattern.
#[derive(Debug)]
pub enum Guard {
    /// The text must match.
    Requires(Regex),
    /// The text must not match.
    Rejects(Regex),
}

impl Guard {
    fn allows(&self, text: &str) -> bool {
        match self {
            Self::Requires(pattern) => pattern.is_match(text),
            Self::Rejects(pattern) => !pattern.is_match(text),
        }
    }
}

/// Custom extraction over the captures of a match and the full text.
pub type Synthesizer = Box<dyn Fn(&Captures<'_>, &str) -> Option<String> + Send + Sync>;

/// How a match becomes a raw candidate title.
pub enum Extraction {
    /// The whole match.
    Whole,
    /// A numbered capture group.
    Group(usize),
    /// A capture group, unless it starts (after whitespace) with a word, ignoring case.
    GroupUnlessPrefixed {
        /// Capture group index.
        group: usize,
        /// Rejected prefix.
        prefix: &'static str,
    },
    /// A capture group with literal replacements applied in order.
    Replace {
        /// Capture group index.
        group: usize,
        /// `(from, to)` pairs applied in sequence.
        pairs: &'static [(&'static str, &'static str)],
    },
    /// A capture group wrapped with fixed text.
    Decorate {
        /// Capture group index.
        group: usize,
        /// Text placed before the group.
        prefix: &'static str,
        /// Text placed after the group.
        suffix: &'static str,
    },
    /// Programmatic synthesis.
    Synthesize(Synthesizer),
}

impl fmt::Debug for Extraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Whole => f.write_str("Whole"),
            Self::Group(group) => f.debug_tuple("Group").field(group).finish(),
            Self::GroupUnlessPrefixed { group, prefix } => f
                .debug_struct("GroupUnlessPrefixed")
                .field("group", group)
                .field("prefix", prefix)
                .finish(),
            Self::Replace { group, pairs } => f
                .debug_struct("Replace")
                .field("group", group)
                .field("pairs", pairs)
                .finish(),
            Self::Decorate {
                group,
                prefix,
                suffix,
            } => f
                .debug_struct("Decorate")
                .field("group", group)
                .field("prefix", prefix)
                .field("suffix", suffix)
                .finish(),
            Self::Synthesize(_) => f.write_str("Synthesize(..)"),
        }
    }
}

impl Extraction {
    fn apply(&self, caps: &Captures<'_>, text: &str) -> Option<String> {
        match self {
            Self::Whole => caps.get(0).map(|m| m.as_str().to_string()),
            Self::Group(group) => caps.get(*group).map(|m| m.as_str().to_string()),
            Self::GroupUnlessPrefixed { group, prefix } => {
                let value = caps.get(*group)?.as_str();
                let head = value.trim_start();
                let rejected = head
                    .get(..prefix.len())
                    .is_some_and(|start| start.eq_ignore_ascii_case(prefix));
                (!rejected).then(|| value.to_string())
            }
            Self::Replace { group, pairs } => {
                let value = caps.get(*group)?.as_str();
                Some(
                    pairs
                        .iter()
                        .fold(value.to_string(), |acc, (from, to)| acc.replace(from, to)),
                )
            }
            Self::Decorate {
                group,
                prefix,
                suffix,
            } => caps
                .get(*group)
                .map(|m| format!("{prefix}{}{suffix}", m.as_str())),
            Self::Synthesize(synthesize) => synthesize(caps, text),
        }
    }
}

/// A single ordered cascade entry.
#[derive(Debug)]
pub struct PatternRule {
    label: &'static str,
    family: RuleFamily,
    pattern: Regex,
    guard: Option<Guard>,
    extraction: Extraction,
}

impl PatternRule {
    /// Build a rule from a compiled pattern.
    #[must_use]
    pub fn new(
        label: &'static str,
        family: RuleFamily,
        pattern: Regex,
        extraction: Extraction,
    ) -> Self {
        Self {
            label,
            family,
            pattern,
            guard: None,
            extraction,
        }
    }

    /// Attach a whole-text guard.
    #[must_use]
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Method label recorded with candidates from this rule.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Family the rule belongs to.
    #[must_use]
    pub const fn family(&self) -> RuleFamily {
        self.family
    }

    /// Raw candidate produced by this rule, if it fires on `text`.
    #[must_use]
    pub fn extract(&self, text: &str) -> Option<String> {
        if self.guard.as_ref().is_some_and(|guard| !guard.allows(text)) {
            return None;
        }
        self.pattern
            .captures_iter(text)
            .find_map(|caps| self.extraction.apply(&caps, text))
            .filter(|candidate| !candidate.trim().is_empty())
    }
}

/// Compile a case-insensitive rule expression.
pub(crate) fn compile(label: &'static str, pattern: &str) -> PatternResult<Regex> {
    build(label, pattern, true)
}

/// Compile a case-sensitive rule expression.
pub(crate) fn compile_exact(label: &'static str, pattern: &str) -> PatternResult<Regex> {
    build(label, pattern, false)
}

fn build(label: &'static str, pattern: &str, case_insensitive: bool) -> PatternResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|source| PatternError::RegexCompile { label, source })
}

/// Compile every rule table in cascade order.
pub(crate) fn all_rules() -> PatternResult<Vec<PatternRule>> {
    let mut rules = Vec::new();
    rules.extend(release::tv_rules()?);
    rules.extend(release::movie_rules()?);
    rules.extend(release::game_rules()?);
    rules.extend(release::app_rules()?);
    rules.extend(info::info_rules()?);
    rules.extend(file::file_rules()?);
    Ok(rules)
}
