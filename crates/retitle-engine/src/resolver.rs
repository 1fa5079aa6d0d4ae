//! Resolution orchestrator and commit protocol.
//!
//! # Design
//! - Stage order per item: exact catalog lookup, fuzzy catalog lookup, filename
//!   catalog lookup (listings only), then the content-class cascade. The first
//!   candidate reaching the commit protocol ends the evaluation.
//! - [`RunState`] is passed explicitly; the idempotency guard refuses a second commit
//!   for an item within one pass.
//! - Persistence side effects are derived from [`ContentClass`], never from method
//!   labels. Preview mode runs every stage and persists nothing.
//! - Search index failures are logged and swallowed; every other collaborator
//!   failure is returned as [`EngineError::Collaborator`].

use std::sync::Arc;

use retitle_config::EngineConfig;
use retitle_core::{
    CandidateMatch, CatalogRecord, CatalogStore, Categorizer, ContentClass, Item, ItemSource,
    PendingItem, PersistenceSink, Resolution, SearchIndex,
};
use retitle_events::{Event, EventBus};
use retitle_patterns::{
    Canonicalizer, PatternLibrary, same_title, strip_short_extension, title_case_words,
};
use retitle_telemetry::Metrics;
use tracing::{debug, info, info_span, warn};

use crate::context::RunState;
use crate::error::{EngineError, EngineResult};
use crate::matcher::{CatalogMatcher, search_tokens};
use crate::outcome::{FuzzyMatch, PassReport, ResolveOutcome, SweepOutcome};

const METHOD_EXACT: &str = "catalog: exact";
const METHOD_FUZZY: &str = "catalog: fuzzy";
const METHOD_FILENAME: &str = "catalog: filename";
const METHOD_FINGERPRINT: &str = "catalog: fingerprint";
const METHOD_SWEEP: &str = "catalog: sweep";

/// External collaborators the resolver drives.
#[derive(Clone)]
pub struct Collaborators {
    /// Curated catalog of known titles.
    pub catalog: Arc<dyn CatalogStore>,
    /// Category inference for new titles.
    pub categorizer: Arc<dyn Categorizer>,
    /// Item store writes.
    pub sink: Arc<dyn PersistenceSink>,
    /// Search index refresh.
    pub index: Arc<dyn SearchIndex>,
}

enum CatalogHit {
    Found(CandidateMatch),
    Ambiguous(usize),
    Miss,
}

/// Name resolution engine for one configuration.
pub struct Resolver {
    library: Arc<PatternLibrary>,
    matcher: CatalogMatcher,
    canon: Canonicalizer,
    categorizer: Arc<dyn Categorizer>,
    sink: Arc<dyn PersistenceSink>,
    index: Arc<dyn SearchIndex>,
    config: EngineConfig,
    metrics: Metrics,
    events: EventBus,
}

impl Resolver {
    /// Build a resolver with a private metrics registry and event bus.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid, the pattern library fails
    /// to compile or the metrics registry cannot be created.
    pub fn new(collaborators: Collaborators, config: EngineConfig) -> EngineResult<Self> {
        Self::with_observers(collaborators, config, Metrics::new()?, EventBus::new())
    }

    /// Build a resolver reporting into shared metrics and events.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid or the pattern library fails
    /// to compile.
    pub fn with_observers(
        collaborators: Collaborators,
        config: EngineConfig,
        metrics: Metrics,
        events: EventBus,
    ) -> EngineResult<Self> {
        config.validate()?;
        let library = Arc::new(PatternLibrary::new()?);
        let matcher = CatalogMatcher::new(
            collaborators.catalog,
            Arc::clone(&library),
            config.matching.clone(),
            metrics.clone(),
        );
        let canon = Canonicalizer::new(
            config.canon.max_title_chars,
            config.canon.abuse_origins.iter().cloned(),
        );
        Ok(Self {
            library,
            matcher,
            canon,
            categorizer: collaborators.categorizer,
            sink: collaborators.sink,
            index: collaborators.index,
            config,
            metrics,
            events,
        })
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Catalog matcher used by the catalog stages.
    #[must_use]
    pub const fn matcher(&self) -> &CatalogMatcher {
        &self.matcher
    }

    /// Metrics registry the resolver reports into.
    #[must_use]
    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Event bus the resolver publishes to.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Evaluate one pending item for `class`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Collaborator`] when a collaborator fails and
    /// [`EngineError::InvalidInput`] for malformed hash digests.
    pub fn evaluate(
        &self,
        state: &mut RunState,
        pending: &PendingItem,
        class: ContentClass,
    ) -> EngineResult<ResolveOutcome> {
        let item = &pending.item;
        let span = info_span!("evaluate", item_id = %item.id, class = %class);
        let _entered = span.enter();

        state.begin_item();
        self.metrics.inc_checked(class.label());

        let outcome = match class {
            ContentClass::ReleaseName
            | ContentClass::InfoFile
            | ContentClass::FileName
            | ContentClass::Par2 => self.evaluate_text(state, pending, class)?,
            ContentClass::Hash { .. } => self.resolve_hash(state, item, pending.text.as_str())?,
            ContentClass::Fingerprint => self.resolve_fingerprint(state, pending)?,
            ContentClass::CatalogTitle => match self.match_catalog_text(&[item.name.as_str()])? {
                CatalogHit::Found(candidate) => self.resolve(state, item, &candidate, class)?,
                CatalogHit::Ambiguous(count) => self.miss(item, class, Some(count))?,
                CatalogHit::Miss => self.miss(item, class, None)?,
            },
            ContentClass::CatalogFile => match self.resolve_filenames(state, pending, class)? {
                Some(outcome) => outcome,
                None => self.miss(item, class, None)?,
            },
        };

        match outcome {
            ResolveOutcome::Ambiguous { .. } => state.ambiguous += 1,
            ResolveOutcome::Skipped => state.skipped += 1,
            _ => {}
        }
        self.metrics.inc_outcome(class.label(), outcome.label());
        Ok(outcome)
    }

    fn evaluate_text(
        &self,
        state: &mut RunState,
        pending: &PendingItem,
        class: ContentClass,
    ) -> EngineResult<ResolveOutcome> {
        let item = &pending.item;
        let body = if class == ContentClass::ReleaseName && pending.text.is_empty() {
            item.name.as_str()
        } else {
            pending.text.as_str()
        };

        if class == ContentClass::InfoFile && self.library.is_obfuscated(body) {
            debug!("obfuscated info file skipped");
            self.finish_class(item, class)?;
            return Ok(ResolveOutcome::Skipped);
        }

        let listing = matches!(class, ContentClass::FileName | ContentClass::Par2);
        let mut ambiguous = None;
        if !(class == ContentClass::InfoFile && self.library.names_provenance(body)) {
            let texts: Vec<&str> = if listing {
                pending.text.entries().collect()
            } else {
                vec![body]
            };
            match self.match_catalog_text(&texts)? {
                CatalogHit::Found(candidate) => return self.resolve(state, item, &candidate, class),
                CatalogHit::Ambiguous(count) => ambiguous = Some(count),
                CatalogHit::Miss => {}
            }
        }

        if listing {
            if let Some(outcome) = self.resolve_filenames(state, pending, class)? {
                return Ok(outcome);
            }
        } else if !self.config.catalog_only
            && let Some(candidate) = self.library.cascade(class, body)
        {
            return self.resolve(state, item, &candidate, class);
        }

        self.miss(item, class, ambiguous)
    }

    fn match_catalog_text(&self, texts: &[&str]) -> EngineResult<CatalogHit> {
        for text in texts {
            for fragment in self.library.scene_fragments(text) {
                if let Some(record) = self.matcher.match_exact(fragment)? {
                    return Ok(CatalogHit::Found(CandidateMatch::from_catalog(
                        &record,
                        METHOD_EXACT,
                    )));
                }
            }
        }

        let mut ambiguous = None;
        for text in texts {
            for fragment in self.library.scene_fragments(text) {
                match self.matcher.match_fuzzy_text(fragment)? {
                    FuzzyMatch::Matched(records) => {
                        if let Some(record) = records.first() {
                            return Ok(CatalogHit::Found(CandidateMatch::from_catalog(
                                record,
                                METHOD_FUZZY,
                            )));
                        }
                    }
                    FuzzyMatch::Ambiguous { count } => {
                        ambiguous.get_or_insert(count);
                    }
                    FuzzyMatch::NoMatch => {}
                }
            }
        }
        Ok(ambiguous.map_or(CatalogHit::Miss, CatalogHit::Ambiguous))
    }

    /// Commit protocol: canonicalize, compare with the current title, then persist.
    ///
    /// At most one candidate is committed per item evaluation (see
    /// [`RunState::begin_item`]). A candidate that canonicalizes to nothing is treated
    /// as a miss, so the class is still marked processed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Collaborator`] when categorization or persistence fails.
    pub fn resolve(
        &self,
        state: &mut RunState,
        item: &Item,
        candidate: &CandidateMatch,
        class: ContentClass,
    ) -> EngineResult<ResolveOutcome> {
        if state.matched || state.committed(item.id) {
            debug!(item_id = %item.id, method = %candidate.method, "item already committed in this pass");
            return Ok(ResolveOutcome::Suppressed);
        }

        let title = self.canon.canonicalize(&candidate.title, &item.origin);
        if title.is_empty() {
            debug!(item_id = %item.id, method = %candidate.method, "candidate canonicalized to an empty title");
            return self.miss(item, class, None);
        }
        state.record_commit(item.id);
        let preview = self.config.mode.is_preview();

        if same_title(&title, &item.title) {
            let linked = candidate
                .catalog_link
                .filter(|link| item.catalog_link != Some(*link));
            if !preview {
                if let Some(catalog_id) = linked {
                    self.sink
                        .link_catalog(item.id, catalog_id)
                        .map_err(EngineError::collaborator("sink.link_catalog", Some(item.id)))?;
                    self.events.publish(Event::CatalogLinked {
                        item_id: item.id,
                        catalog_id: catalog_id.0,
                    });
                }
                self.finish_class(item, class)?;
            }
            debug!(
                item_id = %item.id,
                method = %candidate.method,
                title = %title,
                "candidate matches current title"
            );
            return Ok(ResolveOutcome::Unchanged { title, linked });
        }

        let category = self
            .categorizer
            .determine_category(item.group, &title, &item.origin)
            .map_err(EngineError::collaborator(
                "categorizer.determine_category",
                Some(item.id),
            ))?;
        state.changed += 1;

        if !preview {
            let resolution = Resolution {
                item_id: item.id,
                title: title.clone(),
                category,
                processed: class.processed_flag(),
                dehash_settled: class.settles_dehash(),
                catalog_link: candidate.catalog_link,
                method: candidate.method.clone(),
            };
            self.sink
                .apply_resolution(&resolution)
                .map_err(EngineError::collaborator("sink.apply_resolution", Some(item.id)))?;
            if let Err(err) = self.index.reindex(item.id) {
                warn!(item_id = %item.id, error = %err, "search reindex failed");
            }
            self.metrics.inc_renamed(class.label());
        }

        info!(
            item_id = %item.id,
            class = %class,
            method = %candidate.method,
            old_title = %item.title,
            new_title = %title,
            preview,
            "item renamed"
        );
        self.events.publish(Event::ItemRenamed {
            item_id: item.id,
            class: class.label().to_string(),
            old_title: item.title.clone(),
            new_title: title.clone(),
            method: candidate.method.clone(),
            preview,
        });
        Ok(ResolveOutcome::Renamed {
            title,
            method: candidate.method.clone(),
            category,
            preview,
        })
    }

    /// Look up a content hash; on a miss, decrement the item's dehash budget.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] for malformed digests and
    /// [`EngineError::Collaborator`] when a collaborator fails.
    pub fn resolve_hash(
        &self,
        state: &mut RunState,
        item: &Item,
        digest: &str,
    ) -> EngineResult<ResolveOutcome> {
        let (algorithm, record) = self.matcher.match_hash(digest)?;
        let class = ContentClass::Hash { algorithm };
        if let Some(record) = record {
            let candidate =
                CandidateMatch::from_catalog(&record, format!("catalog: {}", algorithm.label()));
            return self.resolve(state, item, &candidate, class);
        }

        let remaining_attempts = item.dehash_attempts.saturating_sub(1);
        if !self.config.mode.is_preview() {
            self.sink
                .set_dehash_attempts(item.id, remaining_attempts)
                .map_err(EngineError::collaborator(
                    "sink.set_dehash_attempts",
                    Some(item.id),
                ))?;
        }
        debug!(
            item_id = %item.id,
            algorithm = algorithm.label(),
            remaining_attempts,
            "hash lookup missed"
        );
        self.events.publish(Event::DehashMiss {
            item_id: item.id,
            remaining_attempts,
        });
        Ok(ResolveOutcome::HashMiss { remaining_attempts })
    }

    /// Adopt the title of a fingerprint peer of similar size.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Collaborator`] when a collaborator fails.
    pub fn resolve_fingerprint(
        &self,
        state: &mut RunState,
        pending: &PendingItem,
    ) -> EngineResult<ResolveOutcome> {
        let item = &pending.item;
        let Some(fingerprint) = pending
            .fingerprint
            .as_deref()
            .map(str::trim)
            .filter(|fingerprint| !fingerprint.is_empty())
        else {
            return Ok(ResolveOutcome::NoMatch);
        };

        if let Some(peer) = self.matcher.match_fingerprint(fingerprint, item)? {
            let candidate = CandidateMatch {
                title: peer.title,
                method: METHOD_FINGERPRINT.to_string(),
                catalog_link: peer.catalog_link,
            };
            return self.resolve(state, item, &candidate, ContentClass::Fingerprint);
        }
        self.miss(item, ContentClass::Fingerprint, None)
    }

    /// Listing stages: catalog filename match, then the file cascade entry by entry.
    /// Returns `None` when nothing reached the commit protocol.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Collaborator`] when a collaborator fails.
    pub fn resolve_filenames(
        &self,
        state: &mut RunState,
        pending: &PendingItem,
        class: ContentClass,
    ) -> EngineResult<Option<ResolveOutcome>> {
        let item = &pending.item;
        if let Some(record) = self.matcher.match_filename(pending.text.entries())? {
            let candidate = CandidateMatch::from_catalog(&record, METHOD_FILENAME);
            return self.resolve(state, item, &candidate, class).map(Some);
        }
        if self.config.catalog_only {
            return Ok(None);
        }

        for entry in pending.text.entries() {
            let Some(mut candidate) = self.library.cascade(class, entry) else {
                continue;
            };
            if class == ContentClass::Par2 {
                candidate.title = par2_title(&candidate.title);
            }
            return self.resolve(state, item, &candidate, class).map(Some);
        }
        Ok(None)
    }

    /// Rename or link every item whose name or title contains the record title.
    ///
    /// The token search only narrows the candidates; an item is kept when it contains
    /// the whole record title (ignoring case) and is not linked to another record.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Collaborator`] when a collaborator fails.
    pub fn sweep_catalog_record(
        &self,
        state: &mut RunState,
        source: &dyn ItemSource,
        record: &CatalogRecord,
    ) -> EngineResult<SweepOutcome> {
        let tokens = search_tokens(&record.title);
        if tokens.is_empty() {
            return Ok(SweepOutcome::NoMatch);
        }
        let items = source
            .search_items(&tokens, self.matcher.thresholds().fuzzy_limit)
            .map_err(EngineError::collaborator("items.search_items", None))?;

        let needle = record.title.to_lowercase();
        let contains_title = |item: &Item| {
            item.catalog_link.is_none_or(|link| link == record.id)
                && (item.name.to_lowercase().contains(&needle)
                    || item.title.to_lowercase().contains(&needle))
        };
        match self.matcher.verify(items, contains_title) {
            FuzzyMatch::NoMatch => Ok(SweepOutcome::NoMatch),
            FuzzyMatch::Ambiguous { count } => {
                state.ambiguous += 1;
                warn!(catalog_id = %record.id, candidates = count, "catalog sweep ambiguous");
                self.events.publish(Event::AmbiguousMatch {
                    item_id: None,
                    class: ContentClass::CatalogTitle.label().to_string(),
                    candidates: count,
                });
                Ok(SweepOutcome::Ambiguous { count })
            }
            FuzzyMatch::Matched(items) => {
                let candidate = CandidateMatch::from_catalog(record, METHOD_SWEEP);
                let mut count = 0;
                for item in &items {
                    state.begin_item();
                    if self
                        .resolve(state, item, &candidate, ContentClass::CatalogTitle)?
                        .is_match()
                    {
                        count += 1;
                    }
                }
                Ok(SweepOutcome::Matched { count })
            }
        }
    }

    /// Evaluate every pending item of `class` with a fresh [`RunState`].
    ///
    /// A failing item is logged and counted in [`PassReport::errors`]; the pass moves
    /// on to the next item.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Collaborator`] when the pending items cannot be fetched.
    pub fn run_pass(
        &self,
        source: &dyn ItemSource,
        class: ContentClass,
    ) -> EngineResult<PassReport> {
        let pending = source
            .pending(class)
            .map_err(EngineError::collaborator("items.pending", None))?;
        let mut state = RunState::new();
        let mut report = PassReport::new(class);
        for entry in &pending {
            match self.evaluate(&mut state, entry, class) {
                Ok(outcome) => report.record(&outcome),
                Err(err) => {
                    warn!(item_id = %entry.item.id, class = %class, error = %err, "item evaluation failed");
                    self.metrics.inc_outcome(class.label(), "error");
                    report.record_error();
                }
            }
        }
        report.checked = state.checked;
        report.changed = state.changed;

        self.metrics.set_last_pass_items(pending.len());
        info!(
            class = %class,
            checked = report.checked,
            changed = report.changed,
            errors = report.errors,
            "pass completed"
        );
        self.events.publish(Event::PassCompleted {
            class: class.label().to_string(),
            checked: report.checked,
            changed: report.changed,
            errors: report.errors,
        });
        Ok(report)
    }

    fn miss(
        &self,
        item: &Item,
        class: ContentClass,
        ambiguous: Option<usize>,
    ) -> EngineResult<ResolveOutcome> {
        if let Some(candidates) = ambiguous {
            warn!(item_id = %item.id, candidates, "catalog match ambiguous");
            self.events.publish(Event::AmbiguousMatch {
                item_id: Some(item.id),
                class: class.label().to_string(),
                candidates,
            });
        } else {
            debug!(item_id = %item.id, "no candidate found");
        }
        if !self.config.catalog_only {
            self.finish_class(item, class)?;
        }
        Ok(ambiguous.map_or(ResolveOutcome::NoMatch, |candidates| {
            ResolveOutcome::Ambiguous { candidates }
        }))
    }

    fn finish_class(&self, item: &Item, class: ContentClass) -> EngineResult<()> {
        if self.config.mode.is_preview() {
            return Ok(());
        }
        if let Some(flag) = class.processed_flag() {
            self.sink
                .mark_processed(item.id, flag)
                .map_err(EngineError::collaborator("sink.mark_processed", Some(item.id)))?;
        }
        Ok(())
    }
}

fn par2_title(raw: &str) -> String {
    title_case_words(strip_short_extension(raw).unwrap_or(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn par2_candidates_are_title_cased_without_extension() {
        assert_eq!(par2_title("some show s01e01.avi"), "Some Show S01e01");
        assert_eq!(par2_title("another name"), "Another Name");
    }
}
