//! One slot per dataset, filled lazily and at most one fetch sequence at a time.
//!
//! `ensure_loaded` is the only way state changes. The fetch sequence runs on its
//! own task and is shared by every concurrent caller, so a caller that goes away
//! never aborts a load another caller (or a later search) will rely on.

use super::records::{Clinic, CoreData, DogRun, Park, ParkPartition, Resources};
use super::{DatasetError, DatasetKind, LoadReport, LoadState, ParseError, PartialDatasetError};
use crate::config::ResourceConfig;
use crate::loader::ResourceLoader;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, instrument, warn};

type Flight = Shared<BoxFuture<'static, LoadReport>>;

/// Everything cached so far. Cloning is cheap; the view sees a consistent
/// snapshot while later loads keep appending behind it.
#[derive(Debug, Clone, Default)]
pub struct Entries {
    pub core: Option<Arc<CoreData>>,
    pub parks: Arc<Vec<Park>>,
    pub dogruns: Option<Arc<Vec<DogRun>>>,
    pub clinics: Option<Arc<Vec<Clinic>>>,
    pub resources: Option<Arc<Resources>>,
}

/// Public handle to the cache.
#[derive(Clone)]
pub struct DatasetCache {
    loader: Arc<dyn ResourceLoader>,
    plan: Arc<ResourceConfig>,
    inner: Arc<Mutex<CacheInner>>,
}

struct CacheInner {
    slots: HashMap<DatasetKind, Slot>,
    entries: Entries,
}

struct Slot {
    state: LoadState,
    /// Partition ids already appended, in merge order.
    merged: Vec<String>,
    flight: Option<Flight>,
    sequences: usize,
}

impl Slot {
    fn new() -> Self {
        Self {
            state: LoadState::Unloaded,
            merged: Vec::new(),
            flight: None,
            sequences: 0,
        }
    }
}

enum Payload {
    Core(CoreData),
    DogRuns(Vec<DogRun>),
    Clinics(Vec<Clinic>),
    Resources(Resources),
}

impl DatasetCache {
    pub fn new(loader: Arc<dyn ResourceLoader>, plan: ResourceConfig) -> Self {
        let slots = DatasetKind::ALL.into_iter().map(|k| (k, Slot::new())).collect();
        Self {
            loader,
            plan: Arc::new(plan),
            inner: Arc::new(Mutex::new(CacheInner {
                slots,
                entries: Entries::default(),
            })),
        }
    }

    pub fn state(&self, kind: DatasetKind) -> LoadState {
        self.lock().slot(kind).state
    }

    pub fn statuses(&self) -> Vec<(DatasetKind, LoadState)> {
        let inner = self.lock();
        DatasetKind::ALL
            .into_iter()
            .map(|k| (k, inner.slot(k).state))
            .collect()
    }

    pub fn merged_partitions(&self, kind: DatasetKind) -> Vec<String> {
        self.lock().slot(kind).merged.clone()
    }

    /// Whether a fetch sequence for `kind` is running right now.
    pub fn is_loading(&self, kind: DatasetKind) -> bool {
        self.lock().slot(kind).flight.is_some()
    }

    /// Number of fetch sequences ever started for `kind`.
    pub fn sequences_started(&self, kind: DatasetKind) -> usize {
        self.lock().slot(kind).sequences
    }

    pub fn snapshot(&self) -> Entries {
        self.lock().entries.clone()
    }

    /// Resources making up `kind`, in fetch order.
    pub fn resources_for(&self, kind: DatasetKind) -> Vec<String> {
        match kind {
            DatasetKind::Core => vec![self.plan.core.clone()],
            DatasetKind::Parks => self.plan.parks.clone(),
            DatasetKind::DogRuns => vec![self.plan.dogruns.clone()],
            DatasetKind::Clinics => vec![self.plan.clinics.clone()],
            DatasetKind::Resources => vec![self.plan.resources.clone()],
        }
    }

    /// Load `kind` unless it is already loaded, joining any load in flight.
    #[instrument(skip(self))]
    pub async fn ensure_loaded(&self, kind: DatasetKind) -> LoadReport {
        let flight = {
            let mut inner = self.lock();
            let slot = inner.slot_mut(kind);

            if slot.state == LoadState::Loaded {
                debug!("cache hit");
                return LoadReport {
                    dataset: kind,
                    state: LoadState::Loaded,
                    errors: Vec::new(),
                };
            }

            if let Some(flight) = slot.flight.clone() {
                debug!("joining in-flight load");
                flight
            } else {
                let flight = self.start_flight(kind);
                // Cached partitions stay visible while the missing ones are retried.
                if slot.state != LoadState::PartiallyLoaded {
                    slot.state = LoadState::Loading;
                }
                slot.sequences += 1;
                slot.flight = Some(flight.clone());
                info!(sequence = slot.sequences, "loading");
                flight
            }
        };

        flight.await
    }

    fn start_flight(&self, kind: DatasetKind) -> Flight {
        let cache = self.clone();
        let task = tokio::spawn(async move { cache.run_plan(kind).await });

        let cache = self.clone();
        async move {
            match task.await {
                Ok(report) => report,
                Err(join) => {
                    error!(dataset = %kind, error = %join, "load task aborted");
                    cache.settle(kind, Vec::new())
                }
            }
        }
        .boxed()
        .shared()
    }

    async fn run_plan(&self, kind: DatasetKind) -> LoadReport {
        if kind.is_partitioned() {
            self.load_partitions(kind).await
        } else {
            self.load_single(kind).await
        }
    }

    async fn load_single(&self, kind: DatasetKind) -> LoadReport {
        let resource = match self.resources_for(kind).into_iter().next() {
            Some(resource) => resource,
            None => return self.settle(kind, Vec::new()),
        };

        let payload = match self.loader.fetch(&resource).await {
            Ok(value) => decode_payload(kind, &resource, value),
            Err(e) => Err(e.into()),
        };

        match payload {
            Ok(payload) => {
                {
                    let mut inner = self.lock();
                    inner.install(payload);
                    inner.slot_mut(kind).merged.push(resource);
                }
                self.settle(kind, Vec::new())
            }
            Err(e) => {
                warn!(dataset = %kind, error = %e, "dataset failed to load");
                self.settle(kind, vec![e])
            }
        }
    }

    /// Walk the partition list, skipping merged ids. A failed partition does
    /// not stop the walk.
    async fn load_partitions(&self, kind: DatasetKind) -> LoadReport {
        let mut errors = Vec::new();

        for part in self.resources_for(kind) {
            if self.is_merged(kind, &part) {
                continue;
            }

            let batch = match self.loader.fetch(&part).await {
                Ok(value) => decode::<ParkPartition>(&part, value).map_err(DatasetError::from),
                Err(e) => Err(e.into()),
            };

            match batch {
                Ok(batch) => {
                    let mut inner = self.lock();
                    let added = batch.entries.len();
                    Arc::make_mut(&mut inner.entries.parks).extend(batch.entries);
                    inner.slot_mut(kind).merged.push(part.clone());
                    debug!(partition = %part, added, "partition merged");
                }
                Err(e) => {
                    warn!(partition = %part, error = %e, "partition failed; continuing");
                    errors.push(e);
                }
            }
        }

        self.settle(kind, errors)
    }

    fn is_merged(&self, kind: DatasetKind, part: &str) -> bool {
        self.lock().slot(kind).merged.iter().any(|m| m == part)
    }

    /// Final state from merged vs declared resources; clears the flight.
    fn settle(&self, kind: DatasetKind, mut errors: Vec<DatasetError>) -> LoadReport {
        let declared = self.resources_for(kind);
        let mut inner = self.lock();
        let slot = inner.slot_mut(kind);

        let missing: Vec<String> = declared
            .iter()
            .filter(|d| !slot.merged.contains(d))
            .cloned()
            .collect();

        let state = if missing.is_empty() {
            LoadState::Loaded
        } else if slot.merged.is_empty() {
            LoadState::Failed
        } else {
            LoadState::PartiallyLoaded
        };

        if state == LoadState::PartiallyLoaded {
            errors.push(
                PartialDatasetError {
                    dataset: kind,
                    merged: slot.merged.len(),
                    declared: declared.len(),
                    missing,
                }
                .into(),
            );
        }

        slot.state = state;
        slot.flight = None;
        info!(dataset = %kind, state = ?state, errors = errors.len(), "load settled");

        LoadReport {
            dataset: kind,
            state,
            errors,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CacheInner {
    fn slot(&self, kind: DatasetKind) -> &Slot {
        &self.slots[&kind]
    }

    fn slot_mut(&mut self, kind: DatasetKind) -> &mut Slot {
        self.slots.entry(kind).or_insert_with(Slot::new)
    }

    fn install(&mut self, payload: Payload) {
        match payload {
            Payload::Core(core) => self.entries.core = Some(Arc::new(core)),
            Payload::DogRuns(runs) => self.entries.dogruns = Some(Arc::new(runs)),
            Payload::Clinics(clinics) => self.entries.clinics = Some(Arc::new(clinics)),
            Payload::Resources(res) => self.entries.resources = Some(Arc::new(res)),
        }
    }
}

fn decode_payload(
    kind: DatasetKind,
    resource: &str,
    value: serde_json::Value,
) -> Result<Payload, DatasetError> {
    let payload = match kind {
        DatasetKind::Core => Payload::Core(decode(resource, value)?),
        DatasetKind::DogRuns => Payload::DogRuns(decode(resource, value)?),
        DatasetKind::Clinics => Payload::Clinics(decode(resource, value)?),
        DatasetKind::Resources => Payload::Resources(decode(resource, value)?),
        DatasetKind::Parks => {
            return Err(ParseError {
                resource: resource.to_string(),
                message: "parks is loaded by partition".to_string(),
            }
            .into())
        }
    };
    Ok(payload)
}

fn decode<T: DeserializeOwned>(resource: &str, value: serde_json::Value) -> Result<T, ParseError> {
    serde_json::from_value(value).map_err(|e| ParseError {
        resource: resource.to_string(),
        message: e.to_string(),
    })
}
