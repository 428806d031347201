/// Sermon Service Library
///
/// Backend content service for the church sermon archive and the
/// live-stream status board. Public clients read series and messages and
/// poll the live status; an operator pushes live transitions.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: sermon series, messages, and the live singleton record
/// - `services`: business logic — the consistency guard, the live state
///   machine, and the pagination engine
/// - `db`: document-store boundary (Postgres JSONB and in-memory)
/// - `error`: error taxonomy and HTTP mapping
/// - `config`: configuration management
/// - `metrics`: observability collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod openapi;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
