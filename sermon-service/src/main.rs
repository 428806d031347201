use std::io;
use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use sermon_service::db::{PgSermonStore, SermonStore};
use sermon_service::handlers;
use sermon_service::openapi::ApiDoc;
use sermon_service::services::{LiveService, SermonsService};
use sermon_service::Config;

struct HealthState {
    db_pool: sqlx::Pool<sqlx::Postgres>,
}

impl HealthState {
    async fn check_postgres(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.db_pool)
            .await
            .map(|_| ())
    }
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.check_postgres().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "sermon-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "sermon-service"
        })),
    }
}

async fn openapi_json(doc: web::Data<utoipa::openapi::OpenApi>) -> HttpResponse {
    HttpResponse::Ok().json(doc.get_ref())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting sermon-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Database pool + schema
    let db_pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = sqlx::migrate!("./migrations").run(&db_pool).await {
        tracing::error!("Migrations failed: {:#}", e);
        eprintln!("ERROR: Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Connected to database, schema is current");

    let store: Arc<dyn SermonStore> = Arc::new(PgSermonStore::new(db_pool.clone()));
    let store_timeout = Duration::from_millis(config.store.timeout_ms);

    let sermons = web::Data::new(SermonsService::new(store.clone(), store_timeout));
    let live = web::Data::new(LiveService::new(
        store,
        store_timeout,
        config.store.live_cas_max_retries,
    ));
    let health_state = web::Data::new(HealthState {
        db_pool: db_pool.clone(),
    });

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();

    HttpServer::new(move || {
        // Build CORS configuration
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let openapi_doc = ApiDoc::openapi();

        App::new()
            .app_data(web::Data::new(openapi_doc.clone()))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api/v1/openapi.json", openapi_doc),
            )
            .route("/api/v1/openapi.json", web::get().to(openapi_json))
            .app_data(sermons.clone())
            .app_data(live.clone())
            .app_data(health_state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(sermon_service::metrics::serve_metrics))
            .route("/api/v1/health", web::get().to(health_summary))
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/sermons")
                            .service(
                                web::resource("")
                                    .route(web::get().to(handlers::list_all_sermons)),
                            )
                            .route("/paged", web::get().to(handlers::list_paged_sermons))
                            .service(
                                web::resource("/series")
                                    .route(web::post().to(handlers::create_series)),
                            )
                            .route(
                                "/series/slug/{slug}",
                                web::get().to(handlers::get_series_by_slug),
                            )
                            .service(
                                web::resource("/series/{series_id}")
                                    .route(web::get().to(handlers::get_series_by_id))
                                    .route(web::put().to(handlers::update_series)),
                            )
                            .route(
                                "/series/{series_id}/message",
                                web::post().to(handlers::add_message_to_series),
                            )
                            .route(
                                "/message/{message_id}",
                                web::put().to(handlers::update_message),
                            )
                            .route(
                                "/message/{message_id}/move",
                                web::post().to(handlers::move_message),
                            ),
                    )
                    .service(
                        web::scope("/live")
                            .service(
                                web::resource("")
                                    .route(web::get().to(handlers::get_live_status))
                                    .route(web::post().to(handlers::go_live))
                                    .route(web::delete().to(handlers::end_live)),
                            )
                            .route("/poll", web::get().to(handlers::poll_live_status))
                            .route(
                                "/special",
                                web::put().to(handlers::update_special_event),
                            ),
                    ),
            )
    })
    .bind(&bind_address)?
    .workers(4)
    .run()
    .await
}
