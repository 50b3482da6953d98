use std::sync::Arc;

use logger::TracingLogger;

use business::application::scan::get_history::GetScanHistoryUseCaseImpl;
use business::application::scan::predict::PredictScanUseCaseImpl;
use business::domain::logger::Logger;
use business::domain::scan::services::ImageClassifierService;

use classifier::client::ModelArtifactClient;
use classifier::image_classifier::TractImageClassifier;
use classifier::model_handle::{DEFAULT_INPUT_SIZE, ModelHandle};
use object_storage::s3_image_storage::S3ImageStorage;
use persistence::db::PrimaryConnection;
use persistence::scan::fallback::ScanHistoryRepositoryWithFallback;
use persistence::scan::image_store::LocalScanImageStore;
use persistence::scan::local_file::ScanHistoryRepositoryLocalFile;
use persistence::scan::repository::ScanHistoryRepositoryPostgres;

use crate::config::app_config::AppConfig;
use crate::config::model_config::ModelConfig;

pub struct DependencyContainer {
    pub health_api: crate::api::health::routes::Api,
    pub scan_api: crate::api::scan::routes::ScanApi,
}

impl DependencyContainer {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let logger: Arc<dyn Logger> = Arc::new(TracingLogger);

        // Local storage
        let image_store = LocalScanImageStore::new(&config.paths.upload_folder);
        image_store.ensure_directory()?;
        let local_history = ScanHistoryRepositoryLocalFile::new(&config.paths.history_path);
        local_history.ensure_initialized().map_err(|e| {
            anyhow::anyhow!(
                "could not initialise {}: {}",
                config.paths.history_path.display(),
                e
            )
        })?;

        // Primary history store; a failed first attempt is retried lazily
        let primary = Arc::new(PrimaryConnection::new(config.database.clone(), logger.clone()));
        if primary.reconnect().await.is_err() {
            logger.warn("Starting without primary history store, using local fallback");
        }

        let history_repository = Arc::new(ScanHistoryRepositoryWithFallback {
            primary: Arc::new(ScanHistoryRepositoryPostgres::new(primary)),
            fallback: Arc::new(local_history),
            logger: logger.clone(),
        });

        // Remote services
        let storage = Arc::new(S3ImageStorage::from_settings(&config.storage)?);
        let classifier = load_classifier(&config.model, logger.as_ref()).await;
        let health_api = crate::api::health::routes::Api::new(classifier.is_some());

        // Scan use cases
        let predict_use_case = Arc::new(PredictScanUseCaseImpl {
            classifier,
            categories: config.model.categories.clone(),
            image_store: Arc::new(image_store),
            storage,
            repository: history_repository.clone(),
            logger: logger.clone(),
        });
        let get_history_use_case = Arc::new(GetScanHistoryUseCaseImpl {
            repository: history_repository,
            logger,
        });

        let scan_api =
            crate::api::scan::routes::ScanApi::new(predict_use_case, get_history_use_case);

        Ok(Self {
            health_api,
            scan_api,
        })
    }
}

/// Fetches and loads the model once. Any failure leaves the service in
/// degraded mode, where predictions answer 503.
async fn load_classifier(
    config: &ModelConfig,
    logger: &dyn Logger,
) -> Option<Arc<dyn ImageClassifierService>> {
    let Some(url) = config.url.clone() else {
        logger.error("No model location configured, predictions are disabled");
        return None;
    };

    logger.info(&format!("Loading classifier model from {}", url));
    let client = ModelArtifactClient::new(url, config.fetch_timeout);
    match ModelHandle::fetch(&client, DEFAULT_INPUT_SIZE).await {
        Ok(handle) => {
            logger.info("Classifier model loaded");
            Some(Arc::new(TractImageClassifier::new(Arc::new(handle))))
        }
        Err(e) => {
            logger.error(&format!(
                "Classifier model could not be loaded, predictions are disabled: {}",
                e
            ));
            None
        }
    }
}
