use poem::middleware::Cors;

use super::database_config::database_config_from_env;
use super::model_config::ModelConfig;
use super::paths_config::PathsConfig;
use super::storage_config::s3_settings_from_env;
use super::{cors_config, server_config::ServerConfig};

use object_storage::s3_image_storage::S3Settings;
use persistence::db::DatabaseConfig;

pub struct AppConfig {
    pub server: ServerConfig,
    pub cors: Cors,
    pub database: Option<DatabaseConfig>,
    pub storage: S3Settings,
    pub model: ModelConfig,
    pub paths: PathsConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let storage = s3_settings_from_env();
        let model = ModelConfig::from_env(&storage)?;

        Ok(Self {
            server: ServerConfig::from_env(),
            cors: cors_config::init_cors(),
            database: database_config_from_env(),
            storage,
            model,
            paths: PathsConfig::from_env(),
        })
    }
}
