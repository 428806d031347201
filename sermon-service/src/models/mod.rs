/// Data models for the sermon service.
///
/// This module defines structures for:
/// - `SermonSeries`: a named, dated collection of messages sharing a theme
/// - `SermonMessage`: a single talk belonging to exactly one series
/// - `LiveSermons`: the singleton live-stream status record
/// - `LiveState`: tagged union of the live-stream states
///
/// Candidate types (`SeriesCandidate`, `MessageCandidate`) are the
/// unvalidated request shapes; the consistency guard in
/// `services::sermons` turns them into domain values or rejects them.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A sermon series. Owns its message list; message order is delivery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SermonSeries {
    pub id: Uuid,
    pub name: String,
    /// String label for the year the series takes place ("2024", "2024-25").
    pub year: String,
    pub start_date: NaiveDate,
    /// Absent means the series is ongoing, not unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Unique, stable identifier used in public URLs.
    pub slug: String,
    pub thumbnail: String,
    /// Full-resolution series art.
    pub art_url: String,
    /// Server-assigned on every mutation, never trusted from a client.
    pub last_updated: DateTime<Utc>,
    pub messages: Vec<SermonMessage>,
}

impl SermonSeries {
    /// Touch the server-owned timestamp.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated = now;
    }
}

/// A single sermon message. The series owns the message; `series_id` is a
/// back-reference only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SermonMessage {
    pub id: Uuid,
    pub title: String,
    pub speaker: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Scripture reference for the message, e.g. "John 3:16-21".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passage_ref: Option<String>,
    pub series_id: Uuid,
}

/// The default (normally scheduled) stream destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StreamInfo {
    pub title: String,
    pub link: String,
}

/// A temporary special-event override layered on top of the default stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SpecialEvent {
    pub title: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
}

impl SpecialEvent {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expiration, Some(exp) if exp <= now)
    }
}

/// Live-stream state. The override augments the default stream rather than
/// replacing it, so ending a special event can fall back to the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LiveState {
    Inactive,
    Live { stream: StreamInfo },
    SpecialEvent {
        /// The normally scheduled stream, kept so the override never
        /// discards it. Absent when the event was announced from Inactive.
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<StreamInfo>,
        event: SpecialEvent,
    },
}

/// The singleton record describing what is currently live. Created lazily
/// as Inactive, never deleted, mutated only through the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LiveSermons {
    pub is_live: bool,
    pub state: LiveState,
    pub last_updated: DateTime<Utc>,
}

impl LiveSermons {
    pub fn inactive(now: DateTime<Utc>) -> Self {
        Self {
            is_live: false,
            state: LiveState::Inactive,
            last_updated: now,
        }
    }
}

/// A live record paired with the store's compare-and-swap token.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedLive {
    pub version: i64,
    pub record: LiveSermons,
}

/// Unvalidated series request body. Everything is optional here; the
/// consistency guard decides what is required and in what order failures
/// are reported.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SeriesCandidate {
    pub name: Option<String>,
    pub year: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub slug: Option<String>,
    pub thumbnail: Option<String>,
    pub art_url: Option<String>,
    /// Clients may send this; the server discards it silently.
    pub last_updated: Option<DateTime<Utc>>,
    pub messages: Option<Vec<MessageCandidate>>,
}

/// Unvalidated go-live request body.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StreamCandidate {
    pub title: Option<String>,
    pub link: Option<String>,
}

/// Unvalidated special-event override request body.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SpecialEventCandidate {
    pub title: Option<String>,
    pub link: Option<String>,
    pub expiration: Option<DateTime<Utc>>,
}

/// Unvalidated message request body.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct MessageCandidate {
    pub title: Option<String>,
    pub speaker: Option<String>,
    pub date: Option<NaiveDate>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
    pub passage_ref: Option<String>,
}
