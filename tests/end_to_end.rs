use dogpanel::config::{PanelConfig, ResourceConfig};
use dogpanel::dataset::{DatasetCache, DatasetKind, LoadState};
use dogpanel::loader::{FetchCause, MemoryLoader};
use dogpanel::search::{Category, SearchAggregator, SearchOutcome};
use dogpanel::{Panel, PanelEvent, TabView};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

fn two_partition_config() -> PanelConfig {
    PanelConfig {
        resources: ResourceConfig {
            parks: vec!["dog_parks_1.json".into(), "dog_parks_2.json".into()],
            ..ResourceConfig::default()
        },
        ..PanelConfig::default()
    }
}

fn site() -> MemoryLoader {
    MemoryLoader::new()
        .with_json(
            "dog_core.json",
            json!({
                "general_rules": ["No dogs off-leash in playgrounds", "Pick up after your pet"],
                "fines": { "waste": { "violation": "Failure to remove waste", "penalty": "$250" } },
                "licenses": { "requirement": "All dogs need a license" },
                "faq": [{ "q": "Where can my dog run?", "a": "Designated dog runs." }]
            })
            .to_string(),
        )
        .with_json(
            "dog_parks_1.json",
            json!({ "entries": [{ "name": "Riverside Run", "borough": "Manhattan" }] }).to_string(),
        )
        .with_failure("dog_parks_2.json", FetchCause::Status(404))
        .with_json(
            "dog_runs.json",
            json!([{ "name": "Chelsea Waterside", "borough": "Manhattan" }]).to_string(),
        )
        .with_json(
            "clinics_and_services.json",
            json!([{ "name": "Uptown Pet Clinic", "borough": "Manhattan" }]).to_string(),
        )
        .with_json(
            "resources_events_contacts.json",
            json!({ "official": [], "events": [], "contacts": [] }).to_string(),
        )
}

fn drain(rx: &mut UnboundedReceiver<PanelEvent>) -> Vec<PanelEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

#[tokio::test]
async fn playground_finds_the_one_rule() {
    let cache = DatasetCache::new(Arc::new(site()), two_partition_config().resources);
    let aggregator = SearchAggregator::new(cache, 200);

    let SearchOutcome::Results(results) = aggregator.search("playground").await else {
        panic!("expected results");
    };
    assert_eq!(results.total, 1);
    assert_eq!(results.hits[0].category, Category::CoreRule);
    assert_eq!(results.hits[0].title, "No dogs off-leash in playgrounds");
}

#[tokio::test]
async fn second_partition_failing_leaves_parks_partial() {
    let loader = Arc::new(site());
    let cache = DatasetCache::new(loader.clone(), two_partition_config().resources);

    let report = cache.ensure_loaded(DatasetKind::Parks).await;
    assert_eq!(report.state, LoadState::PartiallyLoaded);

    let parks = cache.snapshot().parks;
    assert_eq!(parks.len(), 1);
    assert_eq!(parks[0].name, "Riverside Run");
    assert_eq!(parks[0].borough, "Manhattan");

    cache.ensure_loaded(DatasetKind::Parks).await;
    assert_eq!(loader.calls("dog_parks_1.json"), 1);
    assert_eq!(cache.snapshot().parks.len(), 1);
}

#[tokio::test]
async fn uppercase_query_matches_clinic() {
    let cache = DatasetCache::new(Arc::new(site()), two_partition_config().resources);
    let aggregator = SearchAggregator::new(cache, 200);

    let SearchOutcome::Results(results) = aggregator.search("CLINIC").await else {
        panic!("expected results");
    };
    assert_eq!(results.total, 1);
    assert_eq!(results.hits[0].title, "Uptown Pet Clinic");
}

#[tokio::test]
async fn cap_applies_across_groups() {
    let rules: Vec<String> = (0..150).map(|i| format!("Shared rule {i}")).collect();
    let runs: Vec<_> = (0..100).map(|i| json!({ "name": format!("Shared run {i}") })).collect();
    let loader = site()
        .with_json("dog_core.json", json!({ "general_rules": rules }).to_string())
        .with_json("dog_runs.json", serde_json::Value::Array(runs).to_string());

    let cache = DatasetCache::new(Arc::new(loader), two_partition_config().resources);
    let aggregator = SearchAggregator::new(cache, 200);
    let SearchOutcome::Results(results) = aggregator.search("shared").await else {
        panic!("expected results");
    };

    assert_eq!(results.total, 250);
    assert_eq!(results.hits.len(), 200);
    assert_eq!(results.hits[149].category, Category::CoreRule);
    assert_eq!(results.hits[150].title, "Shared run 0");
    assert_eq!(results.hits[199].title, "Shared run 49");
}

#[tokio::test(start_paused = true)]
async fn typing_burst_runs_one_search() {
    let loader = Arc::new(site());
    let (mut panel, mut rx) = Panel::new(two_partition_config(), loader.clone());

    for text in ["p", "pl", "play", "playground"] {
        panel.on_search_input(text);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panel.flush_search().await;

    let events = drain(&mut rx);
    let searches: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            PanelEvent::Searching(q) => Some(q.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(searches, ["playground"]);

    match events.last() {
        Some(PanelEvent::Results(results)) => {
            assert_eq!(results.total, 1);
            assert_eq!(results.query.as_str(), "playground");
        }
        other => panic!("unexpected final event {other:?}"),
    }
    assert_eq!(loader.calls("dog_core.json"), 1);
}

#[tokio::test(start_paused = true)]
async fn clearing_the_box_redisplays_active_tab_immediately() {
    let loader = Arc::new(site());
    let (mut panel, mut rx) = Panel::new(two_partition_config(), loader.clone());

    panel.select_tab(DatasetKind::DogRuns).await.unwrap();
    drain(&mut rx);

    panel.on_search_input("chelsea");
    panel.on_search_input("   ");
    tokio::time::sleep(Duration::from_secs(1)).await;

    let events = drain(&mut rx);
    assert_eq!(events[0], PanelEvent::Redisplay(DatasetKind::DogRuns));
    assert!(matches!(
        &events[1],
        PanelEvent::Tab { view: TabView::DogRuns(runs), .. } if runs.len() == 1
    ));
    assert!(!events
        .iter()
        .any(|e| matches!(e, PanelEvent::Searching(_) | PanelEvent::Results(_))));

    // The superseded search never ran, so nothing else was fetched.
    assert_eq!(loader.total_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn superseded_search_still_fills_cache_but_is_not_shown() {
    let loader = Arc::new(site().with_latency(Duration::from_millis(500)));
    let (mut panel, mut rx) = Panel::new(two_partition_config(), loader.clone());

    panel.on_search_input("run");
    // Past the quiet interval: the first search is now in flight.
    tokio::time::sleep(Duration::from_millis(400)).await;
    panel.on_search_input("riverside run");
    panel.flush_search().await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    let events = drain(&mut rx);
    let shown: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            PanelEvent::Results(r) => Some(r.query.as_str().to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(shown, ["riverside run"]);
    assert_eq!(
        events.iter().filter(|e| matches!(e, PanelEvent::Searching(_))).count(),
        2
    );

    // Both searches shared the same fetch sequences.
    for kind in DatasetKind::ALL {
        assert_eq!(panel.cache().sequences_started(kind), 1, "{kind}");
    }
    assert_eq!(loader.calls("dog_core.json"), 1);
}

#[tokio::test]
async fn tab_select_reports_partial_parks_and_failed_datasets() {
    let loader = Arc::new(site().with_failure("dog_runs.json", FetchCause::Timeout));
    let (panel, mut rx) = Panel::new(two_partition_config(), loader);

    panel.start().await.unwrap();
    panel.select_tab(DatasetKind::Parks).await.unwrap();
    panel.select_tab(DatasetKind::DogRuns).await.unwrap();

    let events = drain(&mut rx);
    assert!(matches!(
        &events[0],
        PanelEvent::Tab { view: TabView::Overview(core), .. } if core.faq.len() == 1
    ));
    match &events[1] {
        PanelEvent::Tab {
            view: TabView::Parks { parks, boroughs },
            report,
        } => {
            assert_eq!(report.state, LoadState::PartiallyLoaded);
            assert_eq!(parks.len(), 1);
            assert_eq!(boroughs, &["Manhattan"]);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(matches!(&events[2], PanelEvent::TabFailed(r) if r.state == LoadState::Failed));
    assert_eq!(panel.active_tab(), DatasetKind::DogRuns);

    let states = panel.load_states();
    assert_eq!(
        states,
        [
            (DatasetKind::Core, LoadState::Loaded),
            (DatasetKind::Parks, LoadState::PartiallyLoaded),
            (DatasetKind::DogRuns, LoadState::Failed),
            (DatasetKind::Clinics, LoadState::Unloaded),
            (DatasetKind::Resources, LoadState::Unloaded),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn tab_click_and_search_share_one_parks_load() {
    let loader = Arc::new(site().with_latency(Duration::from_millis(100)));
    let mut config = two_partition_config();
    config.search.debounce_ms = 10;
    let (mut panel, mut rx) = Panel::new(config, loader.clone());

    let tab = panel.select_tab(DatasetKind::Parks);
    panel.on_search_input("riverside");
    tab.await.unwrap();
    panel.flush_search().await;

    assert_eq!(loader.calls("dog_parks_1.json"), 1);
    assert_eq!(loader.calls("dog_parks_2.json"), 1);
    assert_eq!(panel.cache().sequences_started(DatasetKind::Parks), 1);

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        PanelEvent::Tab { view: TabView::Parks { parks, .. }, report }
            if parks.len() == 1 && report.state == LoadState::PartiallyLoaded
    )));
    match events.iter().find(|e| matches!(e, PanelEvent::Results(_))) {
        Some(PanelEvent::Results(results)) => {
            assert_eq!(results.total, 1);
            assert_eq!(results.hits[0].title, "Riverside Run");
            assert!(results.degraded().any(|r| r.dataset == DatasetKind::Parks));
        }
        other => panic!("no results event: {other:?}"),
    }
}
