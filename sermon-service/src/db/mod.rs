/// Document-store boundary.
///
/// The core talks to storage only through the `SermonStore` trait. Two
/// implementations exist: `postgres::PgSermonStore` (JSONB documents, the
/// deployment store) and `memory::InMemoryStore` (tests and local dev).
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{LiveSermons, SermonSeries, VersionedLive};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgSermonStore;

/// Minimum storage contract the core requires.
///
/// Per-document writes are atomic; the live record additionally carries a
/// version token so transitions can be applied as compare-and-swap.
#[async_trait]
pub trait SermonStore: Send + Sync {
    async fn get_series(&self, id: Uuid) -> Result<Option<SermonSeries>>;

    async fn get_series_by_slug(&self, slug: &str) -> Result<Option<SermonSeries>>;

    async fn list_series(&self) -> Result<Vec<SermonSeries>>;

    /// Insert or replace a series document keyed by its id.
    async fn upsert_series(&self, series: SermonSeries) -> Result<SermonSeries>;

    /// Resolve the series currently owning a message.
    async fn find_series_for_message(&self, message_id: Uuid) -> Result<Option<SermonSeries>>;

    /// Replace two series documents in one atomic step. Used for message
    /// moves so no reader observes a message owned by zero or two series.
    async fn swap_series(&self, from: SermonSeries, to: SermonSeries) -> Result<()>;

    /// Fetch the live singleton, creating it as Inactive on first access.
    async fn get_live(&self) -> Result<VersionedLive>;

    /// Compare-and-swap the live singleton. Fails with
    /// `AppError::VersionConflict` when `expected_version` is stale.
    async fn update_live(
        &self,
        expected_version: i64,
        record: LiveSermons,
    ) -> Result<VersionedLive>;
}

/// Bound a store call with a timeout; elapse maps to `StoreUnavailable`
/// so a slow store never blocks a request indefinitely.
pub async fn with_timeout<T, F>(limit: Duration, op: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, op).await {
        Ok(result) => result,
        Err(_) => Err(AppError::StoreUnavailable(format!(
            "store call exceeded {}ms",
            limit.as_millis()
        ))),
    }
}
