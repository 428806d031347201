/// Configuration management for the sermon service.
///
/// Everything comes from environment variables with development defaults;
/// production deployments must set CORS origins explicitly.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Document-store call bounds and live CAS retry budget
    pub store: StoreConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Store call policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Upper bound on any single store call, in milliseconds
    pub timeout_ms: u64,
    /// How many times a live transition retries a lost compare-and-swap
    pub live_cas_max_retries: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("SERMON_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("SERMON_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8085),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if app_env.eq_ignore_ascii_case("production") && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/sermons".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            store: StoreConfig {
                timeout_ms: std::env::var("STORE_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(2_000),
                live_cas_max_retries: std::env::var("LIVE_CAS_MAX_RETRIES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3),
            },
        })
    }
}
