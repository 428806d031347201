/// Sermon series and message operations.
///
/// Every mutation passes the consistency guard before a write reaches the
/// store: required fields in a fixed order, server-owned timestamps, date
/// chronology, slug uniqueness, and guarded message ownership (a message is
/// referenced by exactly one series at all times).
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::{with_timeout, SermonStore};
use crate::error::{AppError, Result};
use crate::models::{MessageCandidate, SeriesCandidate, SermonMessage, SermonSeries};
use crate::services::paging::{self, Page};

/// A candidate that survived the guard. Field set mirrors `SermonSeries`
/// minus everything the server assigns itself.
#[derive(Debug, Clone)]
pub struct ValidatedSeries {
    pub name: String,
    pub year: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub slug: String,
    pub thumbnail: String,
    pub art_url: String,
    pub messages: Vec<ValidatedMessage>,
}

#[derive(Debug, Clone)]
pub struct ValidatedMessage {
    pub title: String,
    pub speaker: String,
    pub date: NaiveDate,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
    pub passage_ref: Option<String>,
}

/// A message joined with its owning series, for the cross-series listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageWithSeries {
    #[serde(flatten)]
    pub message: SermonMessage,
    pub series_name: String,
    pub series_slug: String,
    pub series_art: String,
}

fn require<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::missing(field)),
    }
}

/// Validate a series candidate. The first offending field wins; the check
/// order is fixed (Name, ArtUrl, Year, StartDate, Thumbnail, Slug) so
/// clients get stable error messages. A caller-supplied `last_updated` is
/// dropped here, silently.
pub fn validate_series(candidate: &SeriesCandidate) -> Result<ValidatedSeries> {
    let name = require(&candidate.name, "Name")?.to_string();
    let art_url = require(&candidate.art_url, "ArtUrl")?.to_string();
    let year = require(&candidate.year, "Year")?.to_string();
    let start_date = candidate.start_date.ok_or_else(|| AppError::missing("StartDate"))?;
    let thumbnail = require(&candidate.thumbnail, "Thumbnail")?.to_string();
    let slug = require(&candidate.slug, "Slug")?.to_string();

    if let Some(end_date) = candidate.end_date {
        if start_date > end_date {
            return Err(AppError::Chronology);
        }
    }

    let messages = candidate
        .messages
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(validate_message)
        .collect::<Result<Vec<_>>>()?;

    Ok(ValidatedSeries {
        name,
        year,
        start_date,
        end_date: candidate.end_date,
        slug,
        thumbnail,
        art_url,
        messages,
    })
}

/// Validate a message candidate: title, speaker, and date are required,
/// plus at least one media link.
pub fn validate_message(candidate: &MessageCandidate) -> Result<ValidatedMessage> {
    let title = require(&candidate.title, "Title")?.to_string();
    let speaker = require(&candidate.speaker, "Speaker")?.to_string();
    let date = candidate.date.ok_or_else(|| AppError::missing("Date"))?;

    let audio_url = candidate.audio_url.clone().filter(|s| !s.trim().is_empty());
    let video_url = candidate.video_url.clone().filter(|s| !s.trim().is_empty());
    if audio_url.is_none() && video_url.is_none() {
        return Err(AppError::validation(
            "AudioUrl",
            "a message needs at least one media link (AudioUrl or VideoUrl)",
        ));
    }

    Ok(ValidatedMessage {
        title,
        speaker,
        date,
        audio_url,
        video_url,
        passage_ref: candidate.passage_ref.clone().filter(|s| !s.trim().is_empty()),
    })
}

pub struct SermonsService {
    store: Arc<dyn SermonStore>,
    store_timeout: Duration,
}

impl SermonsService {
    pub fn new(store: Arc<dyn SermonStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    pub async fn get_series(&self, id: Uuid) -> Result<SermonSeries> {
        with_timeout(self.store_timeout, self.store.get_series(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no sermon series with id {}", id)))
    }

    pub async fn get_series_by_slug(&self, slug: &str) -> Result<SermonSeries> {
        with_timeout(self.store_timeout, self.store.get_series_by_slug(slug))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no sermon series with slug '{}'", slug)))
    }

    pub async fn list_all(&self) -> Result<Vec<SermonSeries>> {
        with_timeout(self.store_timeout, self.store.list_series()).await
    }

    /// Cross-series message listing, newest-first, in the 5-then-10 page
    /// shape.
    pub async fn list_paged(&self, page_number: u32) -> Result<Page<MessageWithSeries>> {
        let all = self.list_all().await?;

        let mut items: Vec<MessageWithSeries> = all
            .iter()
            .flat_map(|series| {
                series.messages.iter().map(|message| MessageWithSeries {
                    message: message.clone(),
                    series_name: series.name.clone(),
                    series_slug: series.slug.clone(),
                    series_art: series.art_url.clone(),
                })
            })
            .collect();

        paging::order_newest_first(&mut items, |m| (m.message.date, m.message.id));
        paging::paginate(&items, page_number)
    }

    pub async fn create_series(&self, candidate: SeriesCandidate) -> Result<SermonSeries> {
        let validated = validate_series(&candidate)?;
        self.ensure_slug_available(&validated.slug, None).await?;

        let series_id = Uuid::new_v4();
        let messages = validated
            .messages
            .into_iter()
            .map(|m| materialize_message(m, series_id))
            .collect();

        let series = SermonSeries {
            id: series_id,
            name: validated.name,
            year: validated.year,
            start_date: validated.start_date,
            end_date: validated.end_date,
            slug: validated.slug,
            thumbnail: validated.thumbnail,
            art_url: validated.art_url,
            last_updated: Utc::now(),
            messages,
        };

        tracing::info!(series_id = %series.id, slug = %series.slug, "creating sermon series");
        with_timeout(self.store_timeout, self.store.upsert_series(series)).await
    }

    /// Replace a series' metadata. Messages change only through the message
    /// operations below, so a payload carrying any is rejected outright
    /// rather than validated and then ignored. Slug uniqueness is
    /// re-checked on every update, not just at create time.
    pub async fn update_series(
        &self,
        id: Uuid,
        candidate: SeriesCandidate,
    ) -> Result<SermonSeries> {
        if candidate.messages.as_deref().is_some_and(|m| !m.is_empty()) {
            return Err(AppError::validation(
                "Messages",
                "messages cannot be edited through a series update; use the message operations",
            ));
        }

        let existing = self.get_series(id).await?;
        let validated = validate_series(&candidate)?;
        self.ensure_slug_available(&validated.slug, Some(id)).await?;

        let series = SermonSeries {
            id,
            name: validated.name,
            year: validated.year,
            start_date: validated.start_date,
            end_date: validated.end_date,
            slug: validated.slug,
            thumbnail: validated.thumbnail,
            art_url: validated.art_url,
            last_updated: Utc::now(),
            messages: existing.messages,
        };

        with_timeout(self.store_timeout, self.store.upsert_series(series)).await
    }

    /// Append a message to a series. The operator adds messages in delivery
    /// order, so insertion order stays chronological.
    pub async fn add_message(
        &self,
        series_id: Uuid,
        candidate: MessageCandidate,
    ) -> Result<SermonSeries> {
        let mut series = self.get_series(series_id).await?;
        let validated = validate_message(&candidate)?;

        series.messages.push(materialize_message(validated, series_id));
        series.touch(Utc::now());

        with_timeout(self.store_timeout, self.store.upsert_series(series)).await
    }

    /// Patch a message in place. `Some` fields overwrite, `None` fields are
    /// left alone; the patched message must still carry a media link.
    pub async fn update_message(
        &self,
        message_id: Uuid,
        patch: MessageCandidate,
    ) -> Result<SermonMessage> {
        let mut series = self.owning_series(message_id).await?;

        let message = series
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| AppError::NotFound(format!("no message with id {}", message_id)))?;

        apply_message_patch(message, &patch)?;
        let updated = message.clone();
        series.touch(Utc::now());

        with_timeout(self.store_timeout, self.store.upsert_series(series)).await?;
        Ok(updated)
    }

    /// Move a message between series. The back-reference and both message
    /// sequences change through one atomic store call, so no reader ever
    /// sees the message owned by zero or two series. Moving a message to
    /// the series it already belongs to succeeds without changing anything.
    pub async fn move_message(
        &self,
        message_id: Uuid,
        to_series_id: Uuid,
    ) -> Result<SermonSeries> {
        let mut from = self.owning_series(message_id).await?;
        if from.id == to_series_id {
            return Ok(from);
        }

        let mut to = self.get_series(to_series_id).await?;

        let position = from
            .messages
            .iter()
            .position(|m| m.id == message_id)
            .ok_or_else(|| AppError::NotFound(format!("no message with id {}", message_id)))?;
        let mut message = from.messages.remove(position);
        message.series_id = to.id;

        // Keep the destination's delivery-date order.
        let insert_at = to
            .messages
            .iter()
            .position(|m| m.date > message.date)
            .unwrap_or(to.messages.len());
        to.messages.insert(insert_at, message);

        let now = Utc::now();
        from.touch(now);
        to.touch(now);

        tracing::info!(
            message_id = %message_id,
            from_series = %from.id,
            to_series = %to.id,
            "moving sermon message"
        );

        let result = to.clone();
        with_timeout(self.store_timeout, self.store.swap_series(from, to)).await?;
        Ok(result)
    }

    async fn owning_series(&self, message_id: Uuid) -> Result<SermonSeries> {
        with_timeout(
            self.store_timeout,
            self.store.find_series_for_message(message_id),
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no message with id {}", message_id)))
    }

    async fn ensure_slug_available(&self, slug: &str, candidate_id: Option<Uuid>) -> Result<()> {
        let existing =
            with_timeout(self.store_timeout, self.store.get_series_by_slug(slug)).await?;

        match existing {
            // Re-saving the same record under its own slug is fine.
            Some(series) if Some(series.id) != candidate_id => Err(AppError::Conflict(format!(
                "slug '{}' is already in use by another series",
                slug
            ))),
            _ => Ok(()),
        }
    }
}

fn materialize_message(validated: ValidatedMessage, series_id: Uuid) -> SermonMessage {
    SermonMessage {
        id: Uuid::new_v4(),
        title: validated.title,
        speaker: validated.speaker,
        date: validated.date,
        audio_url: validated.audio_url,
        video_url: validated.video_url,
        passage_ref: validated.passage_ref,
        series_id,
    }
}

fn apply_message_patch(message: &mut SermonMessage, patch: &MessageCandidate) -> Result<()> {
    if let Some(title) = &patch.title {
        if title.trim().is_empty() {
            return Err(AppError::missing("Title"));
        }
        message.title = title.clone();
    }
    if let Some(speaker) = &patch.speaker {
        if speaker.trim().is_empty() {
            return Err(AppError::missing("Speaker"));
        }
        message.speaker = speaker.clone();
    }
    if let Some(date) = patch.date {
        message.date = date;
    }
    if let Some(audio) = &patch.audio_url {
        message.audio_url = Some(audio.clone()).filter(|s| !s.trim().is_empty());
    }
    if let Some(video) = &patch.video_url {
        message.video_url = Some(video.clone()).filter(|s| !s.trim().is_empty());
    }
    if let Some(passage) = &patch.passage_ref {
        message.passage_ref = Some(passage.clone()).filter(|s| !s.trim().is_empty());
    }

    if message.audio_url.is_none() && message.video_url.is_none() {
        return Err(AppError::validation(
            "AudioUrl",
            "a message needs at least one media link (AudioUrl or VideoUrl)",
        ));
    }

    Ok(())
}
