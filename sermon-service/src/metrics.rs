//! Prometheus metrics for the sermon service.
//!
//! Exposes live-transition and polling collectors and an HTTP handler for
//! the `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Live state transitions segmented by operation and outcome.
    pub static ref LIVE_TRANSITIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "live_transitions_total",
        "Live state machine transitions segmented by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("failed to register live_transitions_total");

    /// Total poll requests from public clients.
    pub static ref LIVE_POLL_TOTAL: IntCounter = register_int_counter!(
        "live_poll_total",
        "Total live-status poll requests"
    )
    .expect("failed to register live_poll_total");
}

/// Count a live transition attempt by its outcome.
pub fn record_live_transition<T>(operation: &str, result: &crate::error::Result<T>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(_) => "error",
    };
    LIVE_TRANSITIONS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
