//! Prometheus-backed metrics for resolution passes.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Label values are the stable content-class, outcome and lookup-kind names.

use std::sync::Arc;

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{CollectorStage, Result, TelemetryError};

/// Prometheus-backed registry shared by resolvers.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    items_checked_total: IntCounterVec,
    items_renamed_total: IntCounterVec,
    resolution_outcomes_total: IntCounterVec,
    catalog_lookups_total: IntCounterVec,
    last_pass_items: IntGauge,
}

/// Point-in-time view of one content class plus the latest pass size.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Content class the counters belong to.
    pub class: String,
    /// Items of the class evaluated so far.
    pub items_checked: u64,
    /// Items of the class renamed so far.
    pub items_renamed: u64,
    /// Items evaluated by the most recent pass of any class.
    pub last_pass_items: i64,
}

impl Metrics {
    /// Construct a registry with the resolution collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if a collector cannot be built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let items_checked_total = counter_vec(
            "items_checked_total",
            "Items evaluated by content class",
            &["class"],
        )?;
        let items_renamed_total = counter_vec(
            "items_renamed_total",
            "Items renamed by content class",
            &["class"],
        )?;
        let resolution_outcomes_total = counter_vec(
            "resolution_outcomes_total",
            "Resolution outcomes by content class",
            &["class", "outcome"],
        )?;
        let catalog_lookups_total = counter_vec(
            "catalog_lookups_total",
            "Catalog lookups by kind and result",
            &["kind", "result"],
        )?;
        let last_pass_items = IntGauge::with_opts(Opts::new(
            "last_pass_items",
            "Items evaluated by the most recent pass",
        ))
        .map_err(|source| TelemetryError::Collector {
            metric: "last_pass_items",
            stage: CollectorStage::Build,
            source,
        })?;

        register(&registry, "items_checked_total", &items_checked_total)?;
        register(&registry, "items_renamed_total", &items_renamed_total)?;
        register(
            &registry,
            "resolution_outcomes_total",
            &resolution_outcomes_total,
        )?;
        register(&registry, "catalog_lookups_total", &catalog_lookups_total)?;
        register(&registry, "last_pass_items", &last_pass_items)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                items_checked_total,
                items_renamed_total,
                resolution_outcomes_total,
                catalog_lookups_total,
                last_pass_items,
            }),
        })
    }

    /// Count an evaluated item.
    pub fn inc_checked(&self, class: &str) {
        self.inner
            .items_checked_total
            .with_label_values(&[class])
            .inc();
    }

    /// Count a renamed item.
    pub fn inc_renamed(&self, class: &str) {
        self.inner
            .items_renamed_total
            .with_label_values(&[class])
            .inc();
    }

    /// Count a resolution outcome.
    pub fn inc_outcome(&self, class: &str, outcome: &str) {
        self.inner
            .resolution_outcomes_total
            .with_label_values(&[class, outcome])
            .inc();
    }

    /// Count a catalog lookup (`exact`, `fuzzy`, `hash`, `filename`, `fingerprint`).
    pub fn inc_catalog_lookup(&self, kind: &str, result: &str) {
        self.inner
            .catalog_lookups_total
            .with_label_values(&[kind, result])
            .inc();
    }

    /// Record how many items the latest pass evaluated.
    pub fn set_last_pass_items(&self, count: usize) {
        self.inner
            .last_pass_items
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Render the registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the output is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&families, &mut buffer)
            .map_err(|source| TelemetryError::Exposition { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::ExpositionUtf8 { source })
    }

    /// Take a snapshot of the counters recorded for `class`.
    #[must_use]
    pub fn snapshot(&self, class: &str) -> MetricsSnapshot {
        MetricsSnapshot {
            class: class.to_string(),
            items_checked: self
                .inner
                .items_checked_total
                .with_label_values(&[class])
                .get(),
            items_renamed: self
                .inner
                .items_renamed_total
                .with_label_values(&[class])
                .get(),
            last_pass_items: self.inner.last_pass_items.get(),
        }
    }
}

fn counter_vec(name: &'static str, help: &str, labels: &[&str]) -> Result<IntCounterVec> {
    IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::Collector {
            metric: name,
            stage: CollectorStage::Build,
            source,
        })
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::Collector {
            metric: name,
            stage: CollectorStage::Register,
            source,
        })
}
