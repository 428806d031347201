//! Integration tests: store failure propagation.
//!
//! Uses a mocked `SermonStore` to verify that storage failures surface as
//! `StoreUnavailable` through the services instead of panicking or being
//! silently swallowed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use mockall::mock;
use uuid::Uuid;

use sermon_service::db::SermonStore;
use sermon_service::error::{AppError, Result};
use sermon_service::models::{
    LiveSermons, SeriesCandidate, SermonSeries, StreamCandidate, VersionedLive,
};
use sermon_service::services::{LiveService, SermonsService};

mock! {
    Store {}

    #[async_trait]
    impl SermonStore for Store {
        async fn get_series(&self, id: Uuid) -> Result<Option<SermonSeries>>;
        async fn get_series_by_slug(&self, slug: &str) -> Result<Option<SermonSeries>>;
        async fn list_series(&self) -> Result<Vec<SermonSeries>>;
        async fn upsert_series(&self, series: SermonSeries) -> Result<SermonSeries>;
        async fn find_series_for_message(&self, message_id: Uuid) -> Result<Option<SermonSeries>>;
        async fn swap_series(&self, from: SermonSeries, to: SermonSeries) -> Result<()>;
        async fn get_live(&self) -> Result<VersionedLive>;
        async fn update_live(&self, expected_version: i64, record: LiveSermons) -> Result<VersionedLive>;
    }
}

fn down() -> AppError {
    AppError::StoreUnavailable("connection refused".into())
}

#[tokio::test]
async fn poll_surfaces_store_unavailable() {
    let mut store = MockStore::new();
    store.expect_get_live().returning(|| Err(down()));

    let svc = LiveService::new(Arc::new(store), Duration::from_secs(1), 3);
    let err = svc.poll().await.unwrap_err();
    assert!(matches!(err, AppError::StoreUnavailable(_)));
}

#[tokio::test]
async fn go_live_does_not_retry_a_store_outage() {
    let mut store = MockStore::new();
    // One read, one failure, no retry loop on non-conflict errors.
    store.expect_get_live().times(1).returning(|| Err(down()));
    store.expect_update_live().times(0);

    let svc = LiveService::new(Arc::new(store), Duration::from_secs(1), 3);
    let err = svc
        .go_live(StreamCandidate {
            title: Some("Sunday".into()),
            link: Some("https://stream.example.org".into()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::StoreUnavailable(_)));
}

#[tokio::test]
async fn exhausted_cas_retries_surface_the_version_conflict() {
    let mut store = MockStore::new();

    // Every compare-and-swap loses: the service re-reads and retries up to
    // its budget, then hands the conflict to the caller. With a budget of
    // 3 retries that is exactly 4 read/write rounds.
    store.expect_get_live().times(4).returning(|| {
        Ok(VersionedLive {
            version: 0,
            record: LiveSermons::inactive(Utc::now()),
        })
    });
    store
        .expect_update_live()
        .times(4)
        .returning(|_, _| Err(AppError::VersionConflict));

    let svc = LiveService::new(Arc::new(store), Duration::from_secs(1), 3);
    let err = svc
        .go_live(StreamCandidate {
            title: Some("Sunday".into()),
            link: Some("https://stream.example.org".into()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::VersionConflict));
}

#[tokio::test]
async fn create_series_surfaces_store_unavailable_from_the_slug_check() {
    let mut store = MockStore::new();
    store
        .expect_get_series_by_slug()
        .returning(|_| Err(down()));
    store.expect_upsert_series().times(0);

    let svc = SermonsService::new(Arc::new(store), Duration::from_secs(1));
    let err = svc
        .create_series(SeriesCandidate {
            name: Some("Advent".into()),
            year: Some("2024".into()),
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1),
            end_date: None,
            slug: Some("advent-2024".into()),
            thumbnail: Some("https://cdn.example.org/t.jpg".into()),
            art_url: Some("https://cdn.example.org/a.jpg".into()),
            last_updated: None,
            messages: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::StoreUnavailable(_)));
}
