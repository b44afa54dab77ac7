//! End-to-end duration reconciliation against an in-memory catalog

mod helpers;

use discshelf::db::tracks::SqliteTrackStore;
use discshelf::services::catalog::Master;
use discshelf::services::{DurationReconciler, ReconcileReport, ReconcilerConfig};
use helpers::{album_durations, release, seed_album, test_pool, tracklist, video, FakeCatalog};
use sqlx::SqlitePool;

async fn run(pool: &SqlitePool, catalog: &FakeCatalog) -> ReconcileReport {
    run_with(pool, catalog, ReconcilerConfig::unthrottled()).await
}

async fn run_with(
    pool: &SqlitePool,
    catalog: &FakeCatalog,
    config: ReconcilerConfig,
) -> ReconcileReport {
    let store = SqliteTrackStore::new(pool.clone());
    DurationReconciler::new(catalog, &store, config)
        .run()
        .await
        .unwrap()
}

fn master(id: i64, main_release: Option<i64>, entries: &[(&str, &str)]) -> Master {
    Master {
        id,
        title: format!("Master {}", id),
        main_release,
        tracklist: tracklist(entries),
        ..Master::default()
    }
}

#[tokio::test]
async fn test_first_alternate_version_supplies_durations_without_search() {
    let pool = test_pool().await;
    let album_id = seed_album(&pool, Some(100), "Band", &[("One", None), ("Two", None)]).await;
    let catalog = FakeCatalog::default()
        .with_master(master(100, None, &[("One", ""), ("Two", "")]))
        .with_versions(100, &[201, 202])
        .with_release(release(201, &[("One", "3:01"), ("Two", "4:02")]))
        .with_release(release(202, &[("One", "9:99"), ("Two", "9:99")]));

    let report = run(&pool, &catalog).await;

    assert_eq!(report, ReconcileReport { updated: 2, total: 2 });
    assert_eq!(
        album_durations(&pool, album_id).await,
        vec![
            ("One".to_string(), Some("3:01".to_string())),
            ("Two".to_string(), Some("4:02".to_string())),
        ]
    );
    assert_eq!(catalog.count("search:"), 0);
    assert_eq!(catalog.count("release:202"), 0);
    assert_eq!(catalog.count("versions:"), 1);
}

#[tokio::test]
async fn test_album_without_catalog_id_goes_straight_to_search() {
    let pool = test_pool().await;
    let album_id = seed_album(&pool, None, "Band", &[("Found", None), ("Lost", Some(""))]).await;
    let catalog = FakeCatalog::default()
        .with_search_hits("Found", &[301, 302])
        .with_release(release(301, &[("Something Else", "1:00")]))
        .with_release(release(302, &[("found", "2:00")]));

    let report = run(&pool, &catalog).await;

    assert_eq!(report, ReconcileReport { updated: 1, total: 2 });
    assert_eq!(
        album_durations(&pool, album_id).await,
        vec![
            ("Found".to_string(), Some("2:00".to_string())),
            ("Lost".to_string(), Some(String::new())),
        ]
    );
    assert_eq!(catalog.count("master:"), 0);
    assert_eq!(catalog.count("search:"), 2);
    assert!(catalog.calls().contains(&"search:Found|Band".to_string()));
}

#[tokio::test]
async fn test_search_looks_at_first_three_results_only() {
    let pool = test_pool().await;
    seed_album(&pool, None, "Band", &[("Deep", None)]).await;
    let catalog = FakeCatalog::default()
        .with_search_hits("Deep", &[1, 2, 3, 4])
        .with_release(release(4, &[("Deep", "5:55")]));

    let report = run(&pool, &catalog).await;

    assert_eq!(report.updated, 0);
    assert_eq!(catalog.count("release:"), 3);
}

#[tokio::test]
async fn test_second_run_selects_nothing() {
    let pool = test_pool().await;
    seed_album(&pool, Some(100), "Band", &[("One", None)]).await;
    let catalog = FakeCatalog::default()
        .with_master(master(100, Some(150), &[("One", "")]))
        .with_release(release(150, &[("One", "3:00")]));

    assert_eq!(run(&pool, &catalog).await, ReconcileReport { updated: 1, total: 1 });
    let calls_after_first = catalog.calls().len();

    assert_eq!(run(&pool, &catalog).await, ReconcileReport { updated: 0, total: 0 });
    assert_eq!(catalog.calls().len(), calls_after_first);
}

#[tokio::test]
async fn test_master_failure_falls_through_to_search() {
    let pool = test_pool().await;
    let album_id = seed_album(&pool, Some(100), "Band", &[("One", None)]).await;
    let catalog = FakeCatalog::default()
        .with_failing_master(100)
        .with_search_hits("One", &[401])
        .with_release(release(401, &[("One", "1:11")]));

    let report = run(&pool, &catalog).await;

    assert_eq!(report.updated, 1);
    assert_eq!(album_durations(&pool, album_id).await[0].1.as_deref(), Some("1:11"));
    assert_eq!(catalog.count("versions:"), 0);
}

#[tokio::test]
async fn test_album_fetches_happen_once_per_album() {
    let pool = test_pool().await;
    seed_album(&pool, Some(100), "Band", &[("One", None), ("Two", None), ("Three", None)]).await;
    let catalog = FakeCatalog::default()
        .with_master(master(100, Some(150), &[]))
        .with_release(release(150, &[("One", "1:00"), ("Two", "2:00"), ("Three", "3:00")]));

    let report = run(&pool, &catalog).await;

    assert_eq!(report.updated, 3);
    assert_eq!(catalog.count("master:100"), 1);
    assert_eq!(catalog.count("release:150"), 1);
    assert_eq!(catalog.count("versions:"), 0);
}

#[tokio::test]
async fn test_master_videos_fill_when_no_release_is_adopted() {
    let pool = test_pool().await;
    let album_id = seed_album(&pool, Some(100), "Band", &[("Two", None)]).await;
    let mut master = master(100, Some(150), &[("Two", "")]);
    master.videos = vec![video("Band - Two (Official Video)", 125)];
    let catalog = FakeCatalog::default()
        .with_master(master)
        .with_release(release(150, &[("Two", "")]))
        .with_versions(100, &[150]);

    let report = run(&pool, &catalog).await;

    assert_eq!(report.updated, 1);
    assert_eq!(album_durations(&pool, album_id).await[0].1.as_deref(), Some("2:05"));
    assert_eq!(catalog.count("search:"), 0);
    // the main release is skipped while walking versions
    assert_eq!(catalog.count("release:150"), 1);
}

#[tokio::test]
async fn test_master_tracklist_used_when_no_release_is_adopted() {
    let pool = test_pool().await;
    let album_id = seed_album(&pool, Some(100), "Band", &[("One", None)]).await;
    let catalog = FakeCatalog::default().with_master(master(100, None, &[("ONE", "6:06")]));

    run(&pool, &catalog).await;

    assert_eq!(album_durations(&pool, album_id).await[0].1.as_deref(), Some("6:06"));
}

#[tokio::test]
async fn test_blank_titles_are_never_looked_up() {
    let pool = test_pool().await;
    seed_album(&pool, None, "Band", &[("   ", None)]).await;
    let catalog = FakeCatalog::default();

    let report = run(&pool, &catalog).await;

    assert_eq!(report, ReconcileReport { updated: 0, total: 1 });
    assert!(catalog.calls().is_empty());
}

#[tokio::test]
async fn test_version_walk_stops_at_candidate_limit() {
    let pool = test_pool().await;
    seed_album(&pool, Some(100), "Band", &[("One", None)]).await;
    let catalog = FakeCatalog::default()
        .with_master(master(100, None, &[("One", "")]))
        .with_versions(100, &[201, 202, 203, 204, 205])
        .with_release(release(201, &[("One", "")]))
        .with_release(release(202, &[("One", "")]))
        .with_release(release(203, &[("One", "")]))
        .with_release(release(204, &[("One", "")]))
        .with_release(release(205, &[("One", "")]));
    let config = ReconcilerConfig {
        version_candidates: 2,
        ..ReconcilerConfig::unthrottled()
    };

    let report = run_with(&pool, &catalog, config).await;

    assert_eq!(report.updated, 0);
    assert_eq!(catalog.count("versions:"), 1);
    // the search for "One" has no hits, so every release call is a version
    assert_eq!(catalog.count("release:"), 2);
    assert_eq!(catalog.count("release:201"), 1);
    assert_eq!(catalog.count("release:202"), 1);
}

#[tokio::test]
async fn test_padded_title_matches_videos_but_not_tracklist() {
    let pool = test_pool().await;
    let album_id = seed_album(&pool, Some(100), "Band", &[("  One  ", None)]).await;
    let mut main = release(150, &[("One", "3:00")]);
    main.videos = vec![video("Band - One (Live)", 200)];
    let catalog = FakeCatalog::default()
        .with_master(master(100, Some(150), &[]))
        .with_release(main);

    let report = run(&pool, &catalog).await;

    assert_eq!(report.updated, 1);
    assert_eq!(album_durations(&pool, album_id).await[0].1.as_deref(), Some("3:20"));
    assert_eq!(catalog.count("search:"), 0);
}
