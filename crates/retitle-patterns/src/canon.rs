//! Title canonicalization applied to every candidate before it is compared or stored.
//!
//! # Design
//! - Pure and deterministic; no regex state so the helpers can be used without a
//!   compiled [`crate::PatternLibrary`].
//! - Lengths are measured in characters, so truncation never splits a code point.

/// Storage limit for a canonical title, in characters.
pub const MAX_TITLE_CHARS: usize = 255;

/// Group tags rewritten when an item was posted by a known abuse uploader.
const ABUSE_GROUP_TAGS: [&str; 4] = ["KTR", "GUSH", "BIUK", "WEIRD"];

/// Uploader signatures that trigger the trailing group rewrite.
pub const DEFAULT_ABUSE_ORIGINS: [&str; 2] = ["oz@lot.com", "anon@y.com"];

/// Tag substituted for abusive trailing group tokens.
pub const SUBSTITUTE_GROUP_TAG: &str = "SDCLiP";

/// Configurable canonicalization policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonicalizer {
    max_chars: usize,
    abuse_origins: Vec<String>,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new(
            MAX_TITLE_CHARS,
            DEFAULT_ABUSE_ORIGINS.iter().map(ToString::to_string),
        )
    }
}

impl Canonicalizer {
    /// Build a canonicalizer truncating to `max_chars` and rewriting group tags for the
    /// given uploader signatures (matched case-insensitively as substrings).
    #[must_use]
    pub fn new<I, S>(max_chars: usize, abuse_origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            max_chars,
            abuse_origins: abuse_origins
                .into_iter()
                .map(|origin| origin.into().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Produce the clean title for a raw candidate posted by `origin`.
    #[must_use]
    pub fn canonicalize(&self, raw: &str, origin: &str) -> String {
        let head = raw.split('\\').next().unwrap_or_default();
        let trimmed = head.trim_matches(is_edge_noise);

        let rewritten = if self.is_abuse_origin(origin) {
            rewrite_abuse_tag(trimmed)
        } else {
            trimmed.to_string()
        };

        truncate_chars(&rewritten, self.max_chars)
    }

    fn is_abuse_origin(&self, origin: &str) -> bool {
        if origin.is_empty() {
            return false;
        }
        let origin = origin.to_ascii_lowercase();
        self.abuse_origins
            .iter()
            .any(|signature| origin.contains(signature.as_str()))
    }
}

/// Canonicalize with the default policy.
#[must_use]
pub fn canonicalize(raw: &str, origin: &str) -> String {
    Canonicalizer::default().canonicalize(raw, origin)
}

/// Case-insensitive exact comparison deciding whether a rename is a change.
#[must_use]
pub fn same_title(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

/// Upper-case the first character of every whitespace-delimited word.
#[must_use]
pub fn title_case_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = ch.is_whitespace();
    }
    out
}

/// Remove a 2-3 character extension (optionally followed by `PAR2`) from a redundancy
/// file name. Returns `None` when the name carries no such extension.
#[must_use]
pub fn strip_short_extension(name: &str) -> Option<&str> {
    let (stem, extension) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    if is_short_extension(extension) {
        return Some(stem);
    }
    let split = extension.len().checked_sub(4)?;
    let (head, tail) = (extension.get(..split)?, extension.get(split..)?);
    (tail.eq_ignore_ascii_case("par2") && is_short_extension(head)).then_some(stem)
}

fn is_short_extension(extension: &str) -> bool {
    (2..=3).contains(&extension.len()) && extension.chars().all(|ch| ch.is_ascii_alphanumeric())
}

fn is_edge_noise(ch: char) -> bool {
    matches!(ch, '-' | '=' | '_' | '.' | ':') || ch.is_whitespace()
}

fn rewrite_abuse_tag(title: &str) -> String {
    ABUSE_GROUP_TAGS
        .iter()
        .find_map(|tag| title.strip_suffix(tag))
        .map_or_else(
            || title.to_string(),
            |stem| format!("{stem}{SUBSTITUTE_GROUP_TAG}"),
        )
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}
