use std::sync::Arc;

use anyhow::anyhow;
use retitle_config::{EngineConfig, ResolveMode};
use retitle_core::{
    CandidateMatch, CatalogId, CatalogRecord, CategoryId, ContentClass, FingerprintPeer,
    HashAlgorithm, Item, ProcessedFlag,
};
use retitle_engine::{
    Collaborators, EngineError, ResolveOutcome, Resolver, RunState, SweepOutcome,
};
use retitle_events::Event;
use retitle_test_support::fakes::{
    FixedCategorizer, InMemoryCatalog, InMemoryItems, RecordingIndex, RecordingSink, SinkCall,
};
use retitle_test_support::fixtures::{
    item, item_id, pending, pending_fingerprint, pending_listing, record, record_with_filename,
    record_with_hash, sized_item,
};

const TV_RELEASE: &str = "Show.Name.S02E05.720p.HDTV.x264-GROUP";
const MOVIE_RELEASE: &str = "Some.Movie.2010.720p.BluRay-GRP";
const RESOLVED_CATEGORY: CategoryId = CategoryId(5_040);

struct Harness {
    catalog: Arc<InMemoryCatalog>,
    categorizer: Arc<FixedCategorizer>,
    sink: Arc<RecordingSink>,
    index: Arc<RecordingIndex>,
    resolver: Resolver,
}

impl Harness {
    fn new(records: Vec<CatalogRecord>) -> anyhow::Result<Self> {
        Self::build(
            InMemoryCatalog::new(records),
            RecordingSink::new(),
            RecordingIndex::new(),
            EngineConfig::default(),
        )
    }

    fn with_config(records: Vec<CatalogRecord>, config: EngineConfig) -> anyhow::Result<Self> {
        Self::build(
            InMemoryCatalog::new(records),
            RecordingSink::new(),
            RecordingIndex::new(),
            config,
        )
    }

    fn build(
        catalog: InMemoryCatalog,
        sink: RecordingSink,
        index: RecordingIndex,
        config: EngineConfig,
    ) -> anyhow::Result<Self> {
        let catalog = Arc::new(catalog);
        let categorizer = Arc::new(FixedCategorizer::new(RESOLVED_CATEGORY));
        let sink = Arc::new(sink);
        let index = Arc::new(index);
        let resolver = Resolver::new(
            Collaborators {
                catalog: catalog.clone(),
                categorizer: categorizer.clone(),
                sink: sink.clone(),
                index: index.clone(),
            },
            config,
        )?;
        Ok(Self {
            catalog,
            categorizer,
            sink,
            index,
            resolver,
        })
    }

    fn events(&self) -> Vec<Event> {
        self.resolver
            .events()
            .recent()
            .into_iter()
            .map(|envelope| envelope.event)
            .collect()
    }
}

fn preview_config() -> EngineConfig {
    EngineConfig {
        mode: ResolveMode::Preview,
        ..EngineConfig::default()
    }
}

fn catalog_only_config() -> EngineConfig {
    EngineConfig {
        catalog_only: true,
        ..EngineConfig::default()
    }
}

fn renamed_method(outcome: &ResolveOutcome) -> Option<&str> {
    match outcome {
        ResolveOutcome::Renamed { method, .. } => Some(method.as_str()),
        _ => None,
    }
}

fn near_miss_records(title: &str, count: usize) -> Vec<CatalogRecord> {
    (1..=count)
        .map(|n| record(n as u64, &format!("{title}.v{n}")))
        .collect()
}

#[test]
fn release_name_is_renamed_by_tv_cascade() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;
    let mut state = RunState::new();
    let entry = pending(item(1, "a8f3e1c2b9d7"), TV_RELEASE);

    let outcome = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::ReleaseName)?;

    let ResolveOutcome::Renamed {
        title,
        method,
        category,
        preview,
    } = outcome
    else {
        anyhow::bail!("unexpected outcome: {outcome:?}");
    };
    assert_eq!(title, TV_RELEASE);
    assert!(method.starts_with("tv: "), "method was {method}");
    assert_eq!(category, RESOLVED_CATEGORY);
    assert!(!preview);
    assert_eq!(state.checked, 1);
    assert_eq!(state.changed, 1);

    let resolutions = harness.sink.resolutions();
    assert_eq!(resolutions.len(), 1);
    assert_eq!(resolutions[0].item_id, item_id(1));
    assert_eq!(resolutions[0].processed, None);
    assert!(!resolutions[0].dehash_settled);
    assert_eq!(resolutions[0].catalog_link, None);
    assert_eq!(harness.index.reindexed(), vec![item_id(1)]);

    let snapshot = harness.resolver.metrics().snapshot("release_name");
    assert_eq!(snapshot.items_checked, 1);
    assert_eq!(snapshot.items_renamed, 1);
    Ok(())
}

#[test]
fn matching_title_ignoring_case_is_a_no_op() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;
    let mut state = RunState::new();
    let current = TV_RELEASE.to_lowercase();
    let entry = pending(item(1, &current), TV_RELEASE);

    let outcome = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::ReleaseName)?;

    assert_eq!(
        outcome,
        ResolveOutcome::Unchanged {
            title: TV_RELEASE.to_string(),
            linked: None
        }
    );
    assert_eq!(state.changed, 0);
    assert!(harness.sink.calls().is_empty());
    assert_eq!(harness.categorizer.calls(), 0);
    assert!(harness.index.reindexed().is_empty());
    Ok(())
}

#[test]
fn no_op_match_attaches_missing_catalog_link() -> anyhow::Result<()> {
    let harness = Harness::new(vec![record(42, MOVIE_RELEASE)])?;
    let mut state = RunState::new();
    let entry = pending(item(1, MOVIE_RELEASE), "");

    let outcome = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::ReleaseName)?;

    assert_eq!(
        outcome,
        ResolveOutcome::Unchanged {
            title: MOVIE_RELEASE.to_string(),
            linked: Some(CatalogId(42))
        }
    );
    assert_eq!(
        harness.sink.calls(),
        vec![SinkCall::Linked {
            item_id: item_id(1),
            catalog_id: CatalogId(42)
        }]
    );
    assert!(harness.events().contains(&Event::CatalogLinked {
        item_id: item_id(1),
        catalog_id: 42
    }));
    Ok(())
}

#[test]
fn exact_catalog_match_wins_over_cascade() -> anyhow::Result<()> {
    let harness = Harness::new(vec![record(7, TV_RELEASE)])?;
    let mut state = RunState::new();
    let entry = pending(item(1, "obfuscated-name"), TV_RELEASE);

    let outcome = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::ReleaseName)?;

    assert!(matches!(
        outcome,
        ResolveOutcome::Renamed { ref method, .. } if method == "catalog: exact"
    ));
    let resolutions = harness.sink.resolutions();
    assert_eq!(resolutions[0].catalog_link, Some(CatalogId(7)));
    Ok(())
}

#[test]
fn second_commit_in_a_pass_is_suppressed() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;
    let mut state = RunState::new();
    let target = item(1, "a8f3e1c2b9d7");
    let entry = pending(target.clone(), TV_RELEASE);

    let first = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::ReleaseName)?;
    assert!(first.is_match());

    let candidate = CandidateMatch::extracted("Different.Title.S01E01-GRP", "manual");
    let second = harness
        .resolver
        .resolve(&mut state, &target, &candidate, ContentClass::ReleaseName)?;
    assert_eq!(second, ResolveOutcome::Suppressed);
    assert_eq!(harness.sink.resolutions().len(), 1);
    assert_eq!(state.changed, 1);
    Ok(())
}

#[test]
fn sha1_digest_routes_to_sha1_lookup() -> anyhow::Result<()> {
    let digest = "0123456789abcdef0123456789abcdef01234567";
    let harness = Harness::new(vec![record_with_hash(
        3,
        MOVIE_RELEASE,
        HashAlgorithm::Sha1,
        digest,
    )])?;
    let mut state = RunState::new();
    let entry = pending(item(1, "b1946ac92492d2347c6235b4d2611184"), digest);

    let outcome = harness.resolver.evaluate(
        &mut state,
        &entry,
        ContentClass::Hash {
            algorithm: HashAlgorithm::Sha1,
        },
    )?;

    assert!(matches!(
        outcome,
        ResolveOutcome::Renamed { ref method, .. } if method == "catalog: SHA1"
    ));
    assert_eq!(harness.catalog.hash_lookups(), vec![HashAlgorithm::Sha1]);
    let resolutions = harness.sink.resolutions();
    assert!(resolutions[0].dehash_settled);
    assert_eq!(resolutions[0].catalog_link, Some(CatalogId(3)));
    Ok(())
}

#[test]
fn hash_miss_decrements_attempts() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;
    let mut state = RunState::new();
    let entry = pending(item(1, "x"), "D41D8CD98F00B204E9800998ECF8427E");

    let outcome = harness.resolver.evaluate(
        &mut state,
        &entry,
        ContentClass::Hash {
            algorithm: HashAlgorithm::Md5,
        },
    )?;

    assert_eq!(
        outcome,
        ResolveOutcome::HashMiss {
            remaining_attempts: 2
        }
    );
    assert_eq!(harness.catalog.hash_lookups(), vec![HashAlgorithm::Md5]);
    assert_eq!(
        harness.sink.calls(),
        vec![SinkCall::DehashAttempts {
            item_id: item_id(1),
            remaining: 2
        }]
    );
    assert!(harness.events().contains(&Event::DehashMiss {
        item_id: item_id(1),
        remaining_attempts: 2
    }));
    Ok(())
}

#[test]
fn malformed_digest_is_invalid_input() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;
    let mut state = RunState::new();
    let entry = pending(item(1, "x"), "not-a-digest");

    let result = harness.resolver.evaluate(
        &mut state,
        &entry,
        ContentClass::Hash {
            algorithm: HashAlgorithm::Md5,
        },
    );

    assert!(matches!(
        result,
        Err(EngineError::InvalidInput { field: "digest", .. })
    ));
    assert_eq!(harness.catalog.queries(), 0);
    Ok(())
}

#[test]
fn sixteen_fuzzy_rows_are_ambiguous_without_commit() -> anyhow::Result<()> {
    let harness = Harness::new(near_miss_records(MOVIE_RELEASE, 16))?;
    let mut state = RunState::new();
    let entry = pending(item(1, MOVIE_RELEASE), "");

    let outcome = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::CatalogTitle)?;

    assert_eq!(outcome, ResolveOutcome::Ambiguous { candidates: 16 });
    assert_eq!(state.ambiguous, 1);
    assert_eq!(state.changed, 0);
    assert!(harness.sink.calls().is_empty());
    assert!(harness.events().contains(&Event::AmbiguousMatch {
        item_id: Some(item_id(1)),
        class: "catalog_title".to_string(),
        candidates: 16
    }));
    Ok(())
}

#[test]
fn fifteen_fuzzy_rows_are_verified() -> anyhow::Result<()> {
    let harness = Harness::new(near_miss_records(MOVIE_RELEASE, 15))?;
    let mut state = RunState::new();
    let entry = pending(item(1, MOVIE_RELEASE), "");

    let outcome = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::CatalogTitle)?;

    assert_eq!(outcome, ResolveOutcome::NoMatch);
    assert_eq!(state.ambiguous, 0);
    Ok(())
}

#[test]
fn fuzzy_match_accepts_verified_fifteenth_row() -> anyhow::Result<()> {
    // Exact lookups fold ASCII case only, so the accented name misses them and the
    // token search returns all fifteen rows.
    let title = "Élan.Vital.2010.720p.BluRay-GRP";
    let mut records = near_miss_records(title, 14);
    records.push(record(15, title));
    let harness = Harness::new(records)?;
    let mut state = RunState::new();
    let posted = Item {
        title: "a8f3e1c2b9d7".to_string(),
        ..item(1, &title.to_lowercase())
    };

    let outcome = harness.resolver.evaluate(
        &mut state,
        &pending(posted, ""),
        ContentClass::CatalogTitle,
    )?;

    assert_eq!(renamed_method(&outcome), Some("catalog: fuzzy"));
    let resolutions = harness.sink.resolutions();
    assert_eq!(resolutions[0].title, title);
    assert_eq!(resolutions[0].catalog_link, Some(CatalogId(15)));
    assert_eq!(state.ambiguous, 0);
    Ok(())
}

#[test]
fn info_file_title_year_synthesizes_release() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;
    let mut state = RunState::new();
    let body = "Some Movie (2010)\nVideo resolution : 1280 x 720\nSource : DVD\n";
    let entry = pending(item(1, "abc"), body);

    let outcome = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::InfoFile)?;

    assert!(matches!(
        outcome,
        ResolveOutcome::Renamed { ref title, .. } if title == "Some Movie (2010).720p.DVD-NoGroup"
    ));
    let resolutions = harness.sink.resolutions();
    assert_eq!(resolutions[0].processed, Some(ProcessedFlag::Nfo));
    Ok(())
}

#[test]
fn obfuscated_info_file_is_skipped_and_marked_done() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;
    let mut state = RunState::new();
    let entry = pending(item(1, "abc"), "=newz[NZB]=deadbeef\nShow.Name.S01E01-GRP");

    let outcome = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::InfoFile)?;

    assert_eq!(outcome, ResolveOutcome::Skipped);
    assert_eq!(state.skipped, 1);
    assert_eq!(harness.catalog.queries(), 0);
    assert_eq!(
        harness.sink.calls(),
        vec![SinkCall::Processed {
            item_id: item_id(1),
            flag: ProcessedFlag::Nfo
        }]
    );
    Ok(())
}

#[test]
fn info_file_miss_marks_class_done() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;
    let mut state = RunState::new();
    let entry = pending(item(1, "abc"), "random words");

    let outcome = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::InfoFile)?;

    assert_eq!(outcome, ResolveOutcome::NoMatch);
    assert_eq!(
        harness.sink.calls(),
        vec![SinkCall::Processed {
            item_id: item_id(1),
            flag: ProcessedFlag::Nfo
        }]
    );
    Ok(())
}

#[test]
fn candidate_canonicalized_to_nothing_still_marks_class_done() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;
    let mut state = RunState::new();
    let entry = pending(item(1, "abc"), "Path: \\srv\\Show.S01E01.HDTV-GRP  \n");

    let outcome = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::InfoFile)?;

    assert_eq!(outcome, ResolveOutcome::NoMatch);
    assert_eq!(state.changed, 0);
    assert!(!state.matched);
    assert_eq!(
        harness.sink.calls(),
        vec![SinkCall::Processed {
            item_id: item_id(1),
            flag: ProcessedFlag::Nfo
        }]
    );
    Ok(())
}

#[test]
fn catalog_only_mode_skips_cascade_and_flags() -> anyhow::Result<()> {
    let harness = Harness::with_config(Vec::new(), catalog_only_config())?;
    let mut state = RunState::new();
    let body = "Some Movie (2010)\nVideo resolution : 1280 x 720\nSource : DVD\n";
    let entry = pending(item(1, "abc"), body);

    let outcome = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::InfoFile)?;

    assert_eq!(outcome, ResolveOutcome::NoMatch);
    assert!(harness.sink.calls().is_empty());
    Ok(())
}

#[test]
fn listing_matches_catalog_filename() -> anyhow::Result<()> {
    let harness = Harness::new(vec![record_with_filename(
        11,
        "Site.14.03.21.Alpha.Bravo.Chx-GRP",
        "Site.14.03.21.Alpha.Bravo.Chx.mkv",
    )])?;
    let mut state = RunState::new();
    let entry = pending_listing(
        item(1, "abc"),
        &["sample.txt", "Site.14.03.21.Alpha.Bravo.Cha.mkv"],
    );

    let outcome = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::FileName)?;

    assert!(matches!(
        outcome,
        ResolveOutcome::Renamed { ref method, .. } if method == "catalog: filename"
    ));
    let resolutions = harness.sink.resolutions();
    assert_eq!(resolutions[0].title, "Site.14.03.21.Alpha.Bravo.Chx-GRP");
    assert_eq!(resolutions[0].processed, Some(ProcessedFlag::Files));
    assert_eq!(resolutions[0].catalog_link, Some(CatalogId(11)));
    Ok(())
}

#[test]
fn listing_falls_back_to_file_cascade() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;
    let mut state = RunState::new();
    let entry = pending_listing(item(1, "abc"), &["Some Dir/Show.Name.S01E02.720p.mkv"]);

    let outcome = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::FileName)?;

    assert!(matches!(
        outcome,
        ResolveOutcome::Renamed { ref title, ref method, .. }
            if title == "Show.Name.S01E02.720p" && method == "file: Generic TV"
    ));
    Ok(())
}

#[test]
fn par2_entry_drops_extension_before_comparing() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;
    let mut state = RunState::new();
    let entries = ["show name 211.hdtv-lol.avi"];

    let unchanged = harness.resolver.evaluate(
        &mut state,
        &pending_listing(item(1, "show name 211.hdtv-lol"), &entries),
        ContentClass::Par2,
    )?;
    assert_eq!(
        unchanged,
        ResolveOutcome::Unchanged {
            title: "Show Name 211.hdtv-lol".to_string(),
            linked: None
        }
    );
    assert!(harness.sink.resolutions().is_empty());

    let renamed = harness.resolver.evaluate(
        &mut state,
        &pending_listing(item(2, "abc"), &entries),
        ContentClass::Par2,
    )?;
    assert!(matches!(
        renamed,
        ResolveOutcome::Renamed { ref title, .. } if title == "Show Name 211.hdtv-lol"
    ));
    let resolutions = harness.sink.resolutions();
    assert_eq!(resolutions.len(), 1);
    assert_eq!(resolutions[0].processed, Some(ProcessedFlag::Par2));
    Ok(())
}

#[test]
fn one_commit_per_item_evaluation() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;
    let mut state = RunState::new();
    harness.resolver.evaluate(
        &mut state,
        &pending(item(1, "a8f3e1c2b9d7"), TV_RELEASE),
        ContentClass::ReleaseName,
    )?;
    assert!(state.matched);

    let other = item(2, "c0ffee");
    let candidate = CandidateMatch::extracted(MOVIE_RELEASE, "manual");
    let stray = harness
        .resolver
        .resolve(&mut state, &other, &candidate, ContentClass::ReleaseName)?;
    assert_eq!(stray, ResolveOutcome::Suppressed);

    state.begin_item();
    let next = harness
        .resolver
        .resolve(&mut state, &other, &candidate, ContentClass::ReleaseName)?;
    assert_eq!(renamed_method(&next), Some("manual"));
    assert_eq!(harness.sink.resolutions().len(), 2);
    Ok(())
}

#[test]
fn fingerprint_peer_within_tolerance_is_adopted() -> anyhow::Result<()> {
    let peer = FingerprintPeer {
        item_id: item_id(9),
        title: MOVIE_RELEASE.to_string(),
        size: 100,
        catalog_link: Some(CatalogId(4)),
        external_provenance: false,
    };
    let catalog = InMemoryCatalog::new(Vec::new()).with_peers("fp-1", vec![peer]);
    let harness = Harness::build(
        catalog,
        RecordingSink::new(),
        RecordingIndex::new(),
        EngineConfig::default(),
    )?;
    let mut state = RunState::new();

    let within = pending_fingerprint(sized_item(1, "abc", 90), "fp-1");
    let outcome = harness
        .resolver
        .evaluate(&mut state, &within, ContentClass::Fingerprint)?;
    assert!(matches!(
        outcome,
        ResolveOutcome::Renamed { ref method, .. } if method == "catalog: fingerprint"
    ));
    assert_eq!(
        harness.sink.resolutions()[0].processed,
        Some(ProcessedFlag::Uid)
    );

    let outside = pending_fingerprint(sized_item(2, "def", 111), "fp-1");
    let outcome = harness
        .resolver
        .evaluate(&mut state, &outside, ContentClass::Fingerprint)?;
    assert_eq!(outcome, ResolveOutcome::NoMatch);
    assert_eq!(harness.sink.resolutions().len(), 1);
    Ok(())
}

#[test]
fn preview_mode_persists_nothing() -> anyhow::Result<()> {
    let harness = Harness::with_config(Vec::new(), preview_config())?;
    let mut state = RunState::new();
    let entry = pending(item(1, "a8f3e1c2b9d7"), TV_RELEASE);

    let outcome = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::ReleaseName)?;

    assert!(matches!(outcome, ResolveOutcome::Renamed { preview: true, .. }));
    assert_eq!(state.changed, 1);
    assert!(harness.sink.calls().is_empty());
    assert!(harness.index.reindexed().is_empty());
    assert_eq!(
        harness.resolver.metrics().snapshot("release_name").items_renamed,
        0
    );
    assert!(harness.events().iter().any(|event| matches!(
        event,
        Event::ItemRenamed { preview: true, .. }
    )));
    Ok(())
}

#[test]
fn reindex_failure_does_not_fail_resolution() -> anyhow::Result<()> {
    let harness = Harness::build(
        InMemoryCatalog::new(Vec::new()),
        RecordingSink::new(),
        RecordingIndex::new().failing(),
        EngineConfig::default(),
    )?;
    let mut state = RunState::new();
    let entry = pending(item(1, "a8f3e1c2b9d7"), TV_RELEASE);

    let outcome = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::ReleaseName)?;

    assert!(matches!(outcome, ResolveOutcome::Renamed { .. }));
    assert_eq!(harness.sink.resolutions().len(), 1);
    assert_eq!(harness.index.reindexed(), vec![item_id(1)]);
    Ok(())
}

#[test]
fn sink_failure_is_reported_with_context() -> anyhow::Result<()> {
    let harness = Harness::build(
        InMemoryCatalog::new(Vec::new()),
        RecordingSink::new().failing(),
        RecordingIndex::new(),
        EngineConfig::default(),
    )?;
    let mut state = RunState::new();
    let entry = pending(item(1, "a8f3e1c2b9d7"), TV_RELEASE);

    let err = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::ReleaseName)
        .err()
        .ok_or_else(|| anyhow!("expected sink failure"))?;

    match err {
        EngineError::Collaborator {
            operation, item_id: id, ..
        } => {
            assert_eq!(operation, "sink.apply_resolution");
            assert_eq!(id, Some(item_id(1)));
        }
        other => anyhow::bail!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[test]
fn catalog_failure_is_reported_with_context() -> anyhow::Result<()> {
    let harness = Harness::build(
        InMemoryCatalog::new(Vec::new()).failing(),
        RecordingSink::new(),
        RecordingIndex::new(),
        EngineConfig::default(),
    )?;
    let mut state = RunState::new();
    let entry = pending(item(1, "a8f3e1c2b9d7"), TV_RELEASE);

    let result = harness
        .resolver
        .evaluate(&mut state, &entry, ContentClass::ReleaseName);

    assert!(matches!(
        result,
        Err(EngineError::Collaborator {
            operation: "catalog.find_by_title",
            ..
        })
    ));
    Ok(())
}

#[test]
fn sweep_links_items_containing_record_title() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;
    let mut state = RunState::new();
    let source = InMemoryItems::new()
        .with_item(item(1, &MOVIE_RELEASE.to_lowercase()))
        .with_item(Item {
            title: "a8f3e1c2b9d7".to_string(),
            ..item(2, &format!("[01/12] - \"{MOVIE_RELEASE}.part01.rar\""))
        });
    let catalog_record = record(5, MOVIE_RELEASE);

    let outcome = harness
        .resolver
        .sweep_catalog_record(&mut state, &source, &catalog_record)?;

    assert_eq!(outcome, SweepOutcome::Matched { count: 2 });
    let calls = harness.sink.calls();
    assert_eq!(
        calls[0],
        SinkCall::Linked {
            item_id: item_id(1),
            catalog_id: CatalogId(5)
        }
    );
    assert!(matches!(
        &calls[1],
        SinkCall::Applied(resolution)
            if resolution.item_id == item_id(2)
                && resolution.title == MOVIE_RELEASE
                && resolution.method == "catalog: sweep"
    ));
    assert_eq!(state.changed, 1);
    Ok(())
}

#[test]
fn sweep_leaves_token_sharing_and_foreign_linked_items_alone() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;
    let mut state = RunState::new();
    let source = InMemoryItems::new()
        .with_item(item(1, "GRP Show Name S01E01 German Dubbed Extras"))
        .with_item(Item {
            catalog_link: Some(CatalogId(9)),
            ..item(2, "Show.Name.S01E01-GRP.proper")
        });

    let outcome = harness.resolver.sweep_catalog_record(
        &mut state,
        &source,
        &record(5, "Show.Name.S01E01-GRP"),
    )?;

    assert_eq!(outcome, SweepOutcome::NoMatch);
    assert!(harness.sink.calls().is_empty());
    assert_eq!(state.changed, 0);
    Ok(())
}

#[test]
fn sweep_with_too_many_items_is_ambiguous() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;
    let mut state = RunState::new();
    let source = (1..=16).fold(InMemoryItems::new(), |source, n| {
        source.with_item(item(n, &format!("{MOVIE_RELEASE} part {n}")))
    });

    let outcome =
        harness
            .resolver
            .sweep_catalog_record(&mut state, &source, &record(5, MOVIE_RELEASE))?;

    assert_eq!(outcome, SweepOutcome::Ambiguous { count: 16 });
    assert!(harness.sink.calls().is_empty());
    Ok(())
}

#[test]
fn run_pass_reports_outcomes_and_publishes_completion() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;
    let source = InMemoryItems::new()
        .with_pending(
            ContentClass::ReleaseName,
            pending(item(1, "a8f3e1c2b9d7"), TV_RELEASE),
        )
        .with_pending(
            ContentClass::ReleaseName,
            pending(item(2, "c0ffee"), "random words"),
        )
        .with_pending(ContentClass::InfoFile, pending(item(3, "x"), TV_RELEASE));

    let report = harness
        .resolver
        .run_pass(&source, ContentClass::ReleaseName)?;

    assert_eq!(report.checked, 2);
    assert_eq!(report.changed, 1);
    assert_eq!(report.count("renamed"), 1);
    assert_eq!(report.count("no_match"), 1);
    assert_eq!(
        harness.events().last(),
        Some(&Event::PassCompleted {
            class: "release_name".to_string(),
            checked: 2,
            changed: 1,
            errors: 0
        })
    );
    let snapshot = harness.resolver.metrics().snapshot("release_name");
    assert_eq!(snapshot.items_checked, 2);
    assert_eq!(snapshot.last_pass_items, 2);
    Ok(())
}

#[test]
fn failing_item_does_not_abort_the_pass() -> anyhow::Result<()> {
    let digest = "9e107d9d372bb6826bd81d3542a419d6";
    let md5 = ContentClass::Hash {
        algorithm: HashAlgorithm::Md5,
    };
    let harness = Harness::new(vec![record_with_hash(
        4,
        MOVIE_RELEASE,
        HashAlgorithm::Md5,
        digest,
    )])?;
    let source = InMemoryItems::new()
        .with_pending(md5, pending(item(1, "x"), "not-a-digest"))
        .with_pending(md5, pending(item(2, "y"), digest));

    let report = harness.resolver.run_pass(&source, md5)?;

    assert_eq!(report.checked, 2);
    assert_eq!(report.errors, 1);
    assert_eq!(report.count("renamed"), 1);
    let resolutions = harness.sink.resolutions();
    assert_eq!(resolutions.len(), 1);
    assert_eq!(resolutions[0].item_id, item_id(2));
    assert_eq!(resolutions[0].catalog_link, Some(CatalogId(4)));
    assert_eq!(
        harness.events().last(),
        Some(&Event::PassCompleted {
            class: "md5".to_string(),
            checked: 2,
            changed: 1,
            errors: 1
        })
    );
    Ok(())
}

#[test]
fn invalid_configuration_is_rejected() {
    let mut config = EngineConfig::default();
    config.matching.max_verified = 30;
    let result = Harness::with_config(Vec::new(), config);
    let err = result.err().and_then(|err| err.downcast::<EngineError>().ok());
    assert!(matches!(err, Some(EngineError::Config { .. })));
}
