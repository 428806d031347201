/// In-memory `SermonStore` for tests and local development.
///
/// A single `RwLock` over both collections keeps `swap_series` and the live
/// compare-and-swap atomic with respect to every other operation, which is
/// the same guarantee the Postgres store gets from transactions and the
/// versioned UPDATE.
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{LiveSermons, SermonSeries, VersionedLive};

use super::SermonStore;

#[derive(Default)]
struct Collections {
    series: HashMap<Uuid, SermonSeries>,
    live: Option<VersionedLive>,
}

#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Collections>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SermonStore for InMemoryStore {
    async fn get_series(&self, id: Uuid) -> Result<Option<SermonSeries>> {
        let inner = self.inner.read().await;
        Ok(inner.series.get(&id).cloned())
    }

    async fn get_series_by_slug(&self, slug: &str) -> Result<Option<SermonSeries>> {
        let inner = self.inner.read().await;
        Ok(inner.series.values().find(|s| s.slug == slug).cloned())
    }

    async fn list_series(&self) -> Result<Vec<SermonSeries>> {
        let inner = self.inner.read().await;
        let mut all: Vec<SermonSeries> = inner.series.values().cloned().collect();
        all.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn upsert_series(&self, series: SermonSeries) -> Result<SermonSeries> {
        let mut inner = self.inner.write().await;
        inner.series.insert(series.id, series.clone());
        Ok(series)
    }

    async fn find_series_for_message(&self, message_id: Uuid) -> Result<Option<SermonSeries>> {
        let inner = self.inner.read().await;
        Ok(inner
            .series
            .values()
            .find(|s| s.messages.iter().any(|m| m.id == message_id))
            .cloned())
    }

    async fn swap_series(&self, from: SermonSeries, to: SermonSeries) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.series.insert(from.id, from);
        inner.series.insert(to.id, to);
        Ok(())
    }

    async fn get_live(&self) -> Result<VersionedLive> {
        {
            let inner = self.inner.read().await;
            if let Some(live) = &inner.live {
                return Ok(live.clone());
            }
        }

        // Another writer may have created it between the lock drops.
        let mut inner = self.inner.write().await;
        let live = inner
            .live
            .get_or_insert_with(|| VersionedLive {
                version: 0,
                record: LiveSermons::inactive(Utc::now()),
            })
            .clone();
        Ok(live)
    }

    async fn update_live(
        &self,
        expected_version: i64,
        record: LiveSermons,
    ) -> Result<VersionedLive> {
        let mut inner = self.inner.write().await;
        let current = inner.live.get_or_insert_with(|| VersionedLive {
            version: 0,
            record: LiveSermons::inactive(Utc::now()),
        });

        if current.version != expected_version {
            return Err(AppError::VersionConflict);
        }

        let next = VersionedLive {
            version: current.version + 1,
            record,
        };
        inner.live = Some(next.clone());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LiveState;

    #[tokio::test]
    async fn live_singleton_is_created_lazily_as_inactive() {
        let store = InMemoryStore::new();
        let live = store.get_live().await.unwrap();

        assert_eq!(live.version, 0);
        assert!(!live.record.is_live);
        assert_eq!(live.record.state, LiveState::Inactive);
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let store = InMemoryStore::new();
        let live = store.get_live().await.unwrap();

        let updated = store
            .update_live(live.version, live.record.clone())
            .await
            .unwrap();
        assert_eq!(updated.version, 1);

        // A writer holding the old token loses the race.
        let err = store.update_live(live.version, live.record).await;
        assert!(matches!(err, Err(AppError::VersionConflict)));
    }
}
