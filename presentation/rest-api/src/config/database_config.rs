use std::env;
use std::time::Duration;

use persistence::db::DatabaseConfig;

const DEFAULT_MIGRATIONS_PATH: &str = "infrastructure/persistence/migrations";

/// Primary history store settings.
///
/// Environment variables:
/// - DATABASE_URL: PostgreSQL connection string (optional; the service runs on
///   the local fallback history without it)
/// - DATABASE_CONNECT_TIMEOUT_SECS: connect/acquire timeout (default: 5)
/// - MIGRATIONS_PATH: migrations directory (default: "infrastructure/persistence/migrations")
pub fn database_config_from_env() -> Option<DatabaseConfig> {
    let url = env::var("DATABASE_URL").ok().filter(|u| !u.trim().is_empty())?;

    let mut config = DatabaseConfig::new(url);
    if let Some(secs) = env::var("DATABASE_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.acquire_timeout = Duration::from_secs(secs);
    }
    config.migrations_path = Some(
        env::var("MIGRATIONS_PATH").unwrap_or_else(|_| DEFAULT_MIGRATIONS_PATH.to_string()),
    );

    Some(config)
}
