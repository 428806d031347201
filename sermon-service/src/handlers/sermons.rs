/// Sermon archive handlers: series CRUD, message operations, and the two
/// listing views (summary and paged).
use actix_web::{web, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{MessageCandidate, SeriesCandidate, SermonSeries};
use crate::services::sermons::MessageWithSeries;
use crate::services::SermonsService;

#[derive(Debug, Serialize, ToSchema)]
pub struct SeriesSummary {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub slug: String,
    pub thumbnail: String,
    pub message_count: usize,
    pub last_updated: DateTime<Utc>,
}

impl From<&SermonSeries> for SeriesSummary {
    fn from(series: &SermonSeries) -> Self {
        Self {
            id: series.id,
            name: series.name.clone(),
            start_date: series.start_date,
            end_date: series.end_date,
            slug: series.slug.clone(),
            thumbnail: series.thumbnail.clone(),
            message_count: series.messages.len(),
            last_updated: series.last_updated,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AllSermonsResponse {
    pub summaries: Vec<SeriesSummary>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PagedSermonsResponse {
    pub results: Vec<MessageWithSeries>,
    pub page_number: u32,
    pub total_pages: u32,
    pub total_records: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveMessageRequest {
    pub to_series_id: Uuid,
}

/// GET /api/v1/sermons
pub async fn list_all_sermons(service: web::Data<SermonsService>) -> Result<HttpResponse> {
    let all = service.list_all().await?;
    let summaries = all.iter().map(SeriesSummary::from).collect();
    Ok(HttpResponse::Ok().json(AllSermonsResponse { summaries }))
}

/// GET /api/v1/sermons/paged?page=N
pub async fn list_paged_sermons(
    service: web::Data<SermonsService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page = service.list_paged(query.page).await?;
    Ok(HttpResponse::Ok().json(PagedSermonsResponse {
        results: page.items,
        page_number: page.page_number,
        total_pages: page.total_pages,
        total_records: page.total_items,
    }))
}

/// POST /api/v1/sermons/series
pub async fn create_series(
    service: web::Data<SermonsService>,
    body: web::Json<SeriesCandidate>,
) -> Result<HttpResponse> {
    let series = service.create_series(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(series))
}

/// GET /api/v1/sermons/series/{series_id}
pub async fn get_series_by_id(
    service: web::Data<SermonsService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let series = service.get_series(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(series))
}

/// GET /api/v1/sermons/series/slug/{slug}
pub async fn get_series_by_slug(
    service: web::Data<SermonsService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let series = service.get_series_by_slug(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(series))
}

/// PUT /api/v1/sermons/series/{series_id}
pub async fn update_series(
    service: web::Data<SermonsService>,
    path: web::Path<Uuid>,
    body: web::Json<SeriesCandidate>,
) -> Result<HttpResponse> {
    let series = service
        .update_series(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(series))
}

/// POST /api/v1/sermons/series/{series_id}/message
pub async fn add_message_to_series(
    service: web::Data<SermonsService>,
    path: web::Path<Uuid>,
    body: web::Json<MessageCandidate>,
) -> Result<HttpResponse> {
    let series = service
        .add_message(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(series))
}

/// PUT /api/v1/sermons/message/{message_id}
pub async fn update_message(
    service: web::Data<SermonsService>,
    path: web::Path<Uuid>,
    body: web::Json<MessageCandidate>,
) -> Result<HttpResponse> {
    let message = service
        .update_message(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(message))
}

/// POST /api/v1/sermons/message/{message_id}/move
pub async fn move_message(
    service: web::Data<SermonsService>,
    path: web::Path<Uuid>,
    body: web::Json<MoveMessageRequest>,
) -> Result<HttpResponse> {
    let series = service
        .move_message(path.into_inner(), body.to_series_id)
        .await?;
    Ok(HttpResponse::Ok().json(series))
}
