/// Live-stream status handlers.
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::metrics;
use crate::models::{SpecialEventCandidate, StreamCandidate};
use crate::services::LiveService;

/// GET /api/v1/live — the operator's full status view.
pub async fn get_live_status(service: web::Data<LiveService>) -> Result<HttpResponse> {
    let record = service.get_status().await?;
    Ok(HttpResponse::Ok().json(record))
}

/// GET /api/v1/live/poll — the lean snapshot public clients poll.
pub async fn poll_live_status(service: web::Data<LiveService>) -> Result<HttpResponse> {
    metrics::LIVE_POLL_TOTAL.inc();
    let snapshot = service.poll().await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

/// POST /api/v1/live
pub async fn go_live(
    service: web::Data<LiveService>,
    body: web::Json<StreamCandidate>,
) -> Result<HttpResponse> {
    let result = service.go_live(body.into_inner()).await;
    metrics::record_live_transition("go_live", &result);
    Ok(HttpResponse::Ok().json(result?))
}

/// PUT /api/v1/live/special
pub async fn update_special_event(
    service: web::Data<LiveService>,
    body: web::Json<SpecialEventCandidate>,
) -> Result<HttpResponse> {
    let result = service.update_special_event(body.into_inner()).await;
    metrics::record_live_transition("update_special_event", &result);
    Ok(HttpResponse::Ok().json(result?))
}

/// DELETE /api/v1/live
pub async fn end_live(service: web::Data<LiveService>) -> Result<HttpResponse> {
    let result = service.set_inactive().await;
    metrics::record_live_transition("set_inactive", &result);
    Ok(HttpResponse::Ok().json(result?))
}
