/// Live-stream state machine.
///
/// Owns the transitions between `Inactive`, `Live`, and the
/// special-event-override state for the single current broadcast. Every
/// transition is a compare-and-swap against the store's versioned live
/// record: read, mutate, write with the version token, retry a bounded
/// number of times if a concurrent transition won. Two overlapping
/// operations can therefore never interleave into a half-applied record.
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::{with_timeout, SermonStore};
use crate::error::{AppError, Result};
use crate::models::{
    LiveSermons, LiveState, SpecialEvent, SpecialEventCandidate, StreamCandidate, StreamInfo,
};

/// What polling clients see: `is_live` plus the effective title/link. The
/// special-event values win while the override is active and unexpired;
/// otherwise the default stream's values apply.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LiveSnapshot {
    pub is_live: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub special_event: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_event_expiration: Option<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
}

/// Resolve the effective view of a live record at `now`. Pure, so expiry
/// behavior is testable without a clock.
pub fn snapshot(record: &LiveSermons, now: DateTime<Utc>) -> LiveSnapshot {
    let (is_live, title, link, special_event, expiration) = match &record.state {
        LiveState::Inactive => (false, None, None, false, None),
        LiveState::Live { stream } => (
            true,
            Some(stream.title.clone()),
            Some(stream.link.clone()),
            false,
            None,
        ),
        LiveState::SpecialEvent { default, event } => {
            if event.is_expired(now) {
                // Fall back to the schedule; an event announced from
                // Inactive has nothing to fall back to.
                match default {
                    Some(stream) => (
                        true,
                        Some(stream.title.clone()),
                        Some(stream.link.clone()),
                        false,
                        None,
                    ),
                    None => (false, None, None, false, None),
                }
            } else {
                (
                    true,
                    Some(event.title.clone()),
                    Some(event.link.clone()),
                    true,
                    event.expiration,
                )
            }
        }
    };

    LiveSnapshot {
        is_live,
        title,
        link,
        special_event,
        special_event_expiration: expiration,
        last_updated: record.last_updated,
    }
}

#[derive(Clone)]
pub struct LiveService {
    store: Arc<dyn SermonStore>,
    store_timeout: Duration,
    max_cas_retries: u32,
}

impl LiveService {
    pub fn new(store: Arc<dyn SermonStore>, store_timeout: Duration, max_cas_retries: u32) -> Self {
        Self {
            store,
            store_timeout,
            max_cas_retries,
        }
    }

    /// Start (or re-start) the regular live stream. Re-issuing while
    /// already live is a deterministic overwrite, never an error and never
    /// a silent no-op. During a special event only the underlying default
    /// stream is replaced; the override stays on top.
    pub async fn go_live(&self, candidate: StreamCandidate) -> Result<LiveSermons> {
        let stream = validate_stream(&candidate)?;

        self.transition("go_live", move |current| {
            Ok(match &current.state {
                LiveState::SpecialEvent { event, .. } => LiveState::SpecialEvent {
                    default: Some(stream.clone()),
                    event: event.clone(),
                },
                _ => LiveState::Live {
                    stream: stream.clone(),
                },
            })
        })
        .await
    }

    /// Layer a special-event override on top of whatever is scheduled. The
    /// default stream link is kept, never discarded; a special event can
    /// announce a stream even when nothing was previously live.
    pub async fn update_special_event(
        &self,
        candidate: SpecialEventCandidate,
    ) -> Result<LiveSermons> {
        let link = match candidate.link.as_deref() {
            Some(l) if !l.trim().is_empty() => l.to_string(),
            _ => return Err(AppError::missing("Link")),
        };
        let title = candidate.title.clone().filter(|t| !t.trim().is_empty());
        let expiration = candidate.expiration;

        self.transition("update_special_event", move |current| {
            let default = match &current.state {
                LiveState::Live { stream } => Some(stream.clone()),
                LiveState::SpecialEvent { default, .. } => default.clone(),
                LiveState::Inactive => None,
            };

            // An untitled override inherits the title it is covering. With
            // nothing live underneath there is nothing to inherit, so a
            // title is required.
            let title = match title.clone() {
                Some(t) => t,
                None => match (&current.state, &default) {
                    (LiveState::SpecialEvent { event, .. }, _) => event.title.clone(),
                    (_, Some(stream)) => stream.title.clone(),
                    _ => return Err(AppError::missing("Title")),
                },
            };

            Ok(LiveState::SpecialEvent {
                default,
                event: SpecialEvent {
                    title,
                    link: link.clone(),
                    expiration,
                },
            })
        })
        .await
    }

    /// Read-only snapshot for polling clients. A single document read, no
    /// writes, so high-frequency polling causes no write amplification.
    pub async fn poll(&self) -> Result<LiveSnapshot> {
        let live = with_timeout(self.store_timeout, self.store.get_live()).await?;
        Ok(snapshot(&live.record, Utc::now()))
    }

    /// The full live record, for the operator's status view.
    pub async fn get_status(&self) -> Result<LiveSermons> {
        let live = with_timeout(self.store_timeout, self.store.get_live()).await?;
        Ok(live.record)
    }

    /// End the broadcast. Clears any override, idempotent: ending while
    /// already Inactive succeeds and just refreshes the timestamp.
    pub async fn set_inactive(&self) -> Result<LiveSermons> {
        self.transition("set_inactive", |_| Ok(LiveState::Inactive)).await
    }

    /// Atomic read-modify-write with a bounded retry on lost races. The
    /// record may have legitimately changed between attempts, so the
    /// mutation is re-derived from the fresh read each time.
    async fn transition<F>(&self, operation: &'static str, next_state: F) -> Result<LiveSermons>
    where
        F: Fn(&LiveSermons) -> Result<LiveState>,
    {
        let mut attempt = 0;
        loop {
            let current = with_timeout(self.store_timeout, self.store.get_live()).await?;
            let state = next_state(&current.record)?;
            let next = LiveSermons {
                is_live: !matches!(state, LiveState::Inactive),
                state,
                last_updated: Utc::now(),
            };

            match with_timeout(
                self.store_timeout,
                self.store.update_live(current.version, next),
            )
            .await
            {
                Ok(updated) => {
                    tracing::info!(operation, version = updated.version, "live transition applied");
                    return Ok(updated.record);
                }
                Err(AppError::VersionConflict) if attempt < self.max_cas_retries => {
                    attempt += 1;
                    tracing::debug!(operation, attempt, "live transition lost the race, retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn validate_stream(candidate: &StreamCandidate) -> Result<StreamInfo> {
    let title = match candidate.title.as_deref() {
        Some(t) if !t.trim().is_empty() => t.to_string(),
        _ => return Err(AppError::missing("Title")),
    };
    let link = match candidate.link.as_deref() {
        Some(l) if !l.trim().is_empty() => l.to_string(),
        _ => return Err(AppError::missing("Link")),
    };
    Ok(StreamInfo { title, link })
}
