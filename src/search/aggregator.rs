//! Fan out to every dataset, then compose one ordered, capped result list.

use super::normalizer::{normalize, Category};
use super::query::Query;
use crate::dataset::{DatasetCache, DatasetKind, Entries, LoadReport, Record};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Position of a hit: result group first, then ingestion order inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OrderingKey {
    pub group: usize,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub category: Category,
    pub title: String,
    pub meta: Option<String>,
    pub key: OrderingKey,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub query: Query,
    /// At most `cap` hits.
    pub hits: Vec<SearchHit>,
    /// Untruncated match count.
    pub total: usize,
    pub reports: Vec<LoadReport>,
}

impl SearchResults {
    pub fn is_truncated(&self) -> bool {
        self.total > self.hits.len()
    }

    /// Datasets that contributed nothing or only part of their records.
    pub fn degraded(&self) -> impl Iterator<Item = &LoadReport> {
        self.reports.iter().filter(|r| !r.is_complete())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Blank query: show the active tab again instead of results.
    Redisplay,
    Results(SearchResults),
}

pub struct SearchAggregator {
    cache: DatasetCache,
    cap: usize,
}

impl SearchAggregator {
    pub fn new(cache: DatasetCache, cap: usize) -> Self {
        Self { cache, cap }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    #[instrument(skip(self))]
    pub async fn search(&self, raw: &str) -> SearchOutcome {
        let Some(query) = Query::parse(raw) else {
            debug!("blank query");
            return SearchOutcome::Redisplay;
        };

        let reports = join_all(
            DatasetKind::ALL
                .into_iter()
                .map(|kind| self.cache.ensure_loaded(kind)),
        )
        .await;

        for report in reports.iter().filter(|r| !r.is_complete()) {
            warn!(dataset = %report.dataset, state = ?report.state, "searching degraded dataset");
        }

        let entries = self.cache.snapshot();
        let mut hits = scan(&entries, &query);
        let total = hits.len();
        hits.truncate(self.cap);

        info!(query = %query, total, shown = hits.len(), "search complete");
        SearchOutcome::Results(SearchResults {
            query,
            hits,
            total,
            reports,
        })
    }
}

/// Every record in result-group order: rules, fines, parks, dog runs,
/// clinics, events, contacts.
pub fn records(entries: &Entries) -> impl Iterator<Item = Record<'_>> {
    let core = entries.core.as_deref();
    let resources = entries.resources.as_deref();

    core.into_iter()
        .flat_map(|c| c.general_rules.iter().map(|r| Record::CoreRule(r.as_str())))
        .chain(core.into_iter().flat_map(|c| c.fines.iter().map(Record::Fine)))
        .chain(entries.parks.iter().map(Record::Park))
        .chain(entries.dogruns.iter().flat_map(|v| v.iter().map(Record::DogRun)))
        .chain(entries.clinics.iter().flat_map(|v| v.iter().map(Record::Clinic)))
        .chain(resources.into_iter().flat_map(|r| r.events.iter().map(Record::Event)))
        .chain(resources.into_iter().flat_map(|r| r.contacts.iter().map(Record::Contact)))
}

/// All matches, uncapped, in group then ingestion order.
pub fn scan(entries: &Entries, query: &Query) -> Vec<SearchHit> {
    let mut positions = [0usize; Category::ORDER.len()];
    let mut hits = Vec::new();

    for record in records(entries) {
        let projection = normalize(record);
        let group = projection.category.group();
        let position = positions[group];
        positions[group] += 1;

        if projection.matches(query) {
            hits.push(SearchHit {
                category: projection.category,
                title: projection.title,
                meta: projection.meta,
                key: OrderingKey { group, position },
            });
        }
    }

    hits
}
