//! Render-ready per-tab data handed to the view layer.

use crate::dataset::{Clinic, CoreData, DatasetKind, DogRun, Entries, Park, Resources};
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum TabView {
    Overview(Arc<CoreData>),
    Parks {
        parks: Arc<Vec<Park>>,
        /// Sorted, distinct; feeds the borough filter.
        boroughs: Vec<String>,
    },
    DogRuns(Arc<Vec<DogRun>>),
    Clinics(Arc<Vec<Clinic>>),
    Resources(Arc<Resources>),
}

impl TabView {
    /// `None` when the dataset has nothing cached yet.
    pub fn from_entries(kind: DatasetKind, entries: &Entries) -> Option<Self> {
        match kind {
            DatasetKind::Core => entries.core.clone().map(TabView::Overview),
            DatasetKind::Parks => Some(TabView::Parks {
                boroughs: boroughs(&entries.parks),
                parks: entries.parks.clone(),
            }),
            DatasetKind::DogRuns => entries.dogruns.clone().map(TabView::DogRuns),
            DatasetKind::Clinics => entries.clinics.clone().map(TabView::Clinics),
            DatasetKind::Resources => entries.resources.clone().map(TabView::Resources),
        }
    }

    pub fn dataset(&self) -> DatasetKind {
        match self {
            TabView::Overview(_) => DatasetKind::Core,
            TabView::Parks { .. } => DatasetKind::Parks,
            TabView::DogRuns(_) => DatasetKind::DogRuns,
            TabView::Clinics(_) => DatasetKind::Clinics,
            TabView::Resources(_) => DatasetKind::Resources,
        }
    }

    /// Entry count shown in the tab header.
    pub fn len(&self) -> usize {
        match self {
            TabView::Overview(core) => core.general_rules.len() + core.fines.len(),
            TabView::Parks { parks, .. } => parks.len(),
            TabView::DogRuns(runs) => runs.len(),
            TabView::Clinics(clinics) => clinics.len(),
            TabView::Resources(res) => res.events.len() + res.contacts.len() + res.official.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn boroughs(parks: &[Park]) -> Vec<String> {
    parks
        .iter()
        .map(|p| p.borough.clone())
        .filter(|b| !b.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeashFilter {
    /// Any off-leash hours or designated areas.
    OffLeash,
    /// No off-leash hours.
    LeashOnly,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParkFilter {
    pub borough: Option<String>,
    pub leash: Option<LeashFilter>,
}

impl ParkFilter {
    pub fn is_clear(&self) -> bool {
        self.borough.is_none() && self.leash.is_none()
    }

    pub fn accepts(&self, park: &Park) -> bool {
        if let Some(borough) = &self.borough {
            if &park.borough != borough {
                return false;
            }
        }
        match self.leash {
            Some(LeashFilter::OffLeash) => {
                !park.off_leash_hours.is_empty() || !park.designated_areas.is_empty()
            }
            Some(LeashFilter::LeashOnly) => park.off_leash_hours.is_empty(),
            None => true,
        }
    }

    /// Matching parks in ingestion order.
    pub fn apply<'a>(&self, parks: &'a [Park]) -> Vec<&'a Park> {
        parks.iter().filter(|p| self.accepts(p)).collect()
    }
}
