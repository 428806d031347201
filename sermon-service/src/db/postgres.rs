/// Postgres-backed `SermonStore`.
///
/// Series are stored as JSONB documents keyed by id, with the slug
/// extracted into a unique column so lookups and the uniqueness constraint
/// stay in the database. The live singleton lives in a one-row table with a
/// version column; transitions are applied with
/// `UPDATE .. WHERE version = $n`, so a stale writer updates zero rows and
/// gets `VersionConflict` instead of clobbering a concurrent transition.
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{LiveSermons, SermonSeries, VersionedLive};

use super::SermonStore;

#[derive(Clone)]
pub struct PgSermonStore {
    pool: PgPool,
}

impl PgSermonStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode_series(doc: serde_json::Value) -> Result<SermonSeries> {
    serde_json::from_value(doc).map_err(AppError::from)
}

fn decode_live(row: &sqlx::postgres::PgRow) -> Result<VersionedLive> {
    let version: i64 = row.get("version");
    let doc: serde_json::Value = row.get("doc");
    Ok(VersionedLive {
        version,
        record: serde_json::from_value(doc)?,
    })
}

#[async_trait]
impl SermonStore for PgSermonStore {
    async fn get_series(&self, id: Uuid) -> Result<Option<SermonSeries>> {
        let doc = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT doc FROM sermon_series WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        doc.map(decode_series).transpose()
    }

    async fn get_series_by_slug(&self, slug: &str) -> Result<Option<SermonSeries>> {
        let doc = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT doc FROM sermon_series WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        doc.map(decode_series).transpose()
    }

    async fn list_series(&self) -> Result<Vec<SermonSeries>> {
        let docs = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT doc FROM sermon_series ORDER BY (doc->>'start_date') DESC, id",
        )
        .fetch_all(&self.pool)
        .await?;

        docs.into_iter().map(decode_series).collect()
    }

    async fn upsert_series(&self, series: SermonSeries) -> Result<SermonSeries> {
        let doc = serde_json::to_value(&series)?;

        sqlx::query(
            r#"
            INSERT INTO sermon_series (id, slug, doc, last_updated)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
              SET slug = EXCLUDED.slug,
                  doc = EXCLUDED.doc,
                  last_updated = EXCLUDED.last_updated
            "#,
        )
        .bind(series.id)
        .bind(&series.slug)
        .bind(&doc)
        .bind(series.last_updated)
        .execute(&self.pool)
        .await?;

        Ok(series)
    }

    async fn find_series_for_message(&self, message_id: Uuid) -> Result<Option<SermonSeries>> {
        let doc = sqlx::query_scalar::<_, serde_json::Value>(
            r#"
            SELECT doc FROM sermon_series
            WHERE doc->'messages' @> jsonb_build_array(jsonb_build_object('id', $1::text))
            "#,
        )
        .bind(message_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        doc.map(decode_series).transpose()
    }

    async fn swap_series(&self, from: SermonSeries, to: SermonSeries) -> Result<()> {
        let from_doc = serde_json::to_value(&from)?;
        let to_doc = serde_json::to_value(&to)?;

        let mut tx = self.pool.begin().await?;

        for (series, doc) in [(&from, &from_doc), (&to, &to_doc)] {
            sqlx::query(
                r#"
                INSERT INTO sermon_series (id, slug, doc, last_updated)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE
                  SET slug = EXCLUDED.slug,
                      doc = EXCLUDED.doc,
                      last_updated = EXCLUDED.last_updated
                "#,
            )
            .bind(series.id)
            .bind(&series.slug)
            .bind(doc)
            .bind(series.last_updated)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_live(&self) -> Result<VersionedLive> {
        let initial = serde_json::to_value(LiveSermons::inactive(Utc::now()))?;

        sqlx::query(
            "INSERT INTO live_sermons (id, version, doc) VALUES (1, 0, $1) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&initial)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT version, doc FROM live_sermons WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;

        decode_live(&row)
    }

    async fn update_live(
        &self,
        expected_version: i64,
        record: LiveSermons,
    ) -> Result<VersionedLive> {
        let doc = serde_json::to_value(&record)?;

        let row = sqlx::query(
            r#"
            UPDATE live_sermons
            SET doc = $1, version = version + 1
            WHERE id = 1 AND version = $2
            RETURNING version, doc
            "#,
        )
        .bind(&doc)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => decode_live(&row),
            None => Err(AppError::VersionConflict),
        }
    }
}
