use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::logger::Logger;
use crate::domain::scan::errors::ScanError;
use crate::domain::scan::model::{Classification, NewScanResultProps, ScanResult};
use crate::domain::scan::repository::ScanHistoryRepository;
use crate::domain::scan::services::{ImageClassifierService, ImageStorageService, ScanImageStore};
use crate::domain::scan::use_cases::predict::{PredictScanParams, PredictScanUseCase};
use crate::domain::scan::value_objects::{CategoryLabels, ImageExtension, ScanFileName};

pub struct PredictScanUseCaseImpl {
    /// `None` when the model could not be loaded at startup.
    pub classifier: Option<Arc<dyn ImageClassifierService>>,
    pub categories: CategoryLabels,
    pub image_store: Arc<dyn ScanImageStore>,
    pub storage: Arc<dyn ImageStorageService>,
    pub repository: Arc<dyn ScanHistoryRepository>,
    pub logger: Arc<dyn Logger>,
}

#[async_trait]
impl PredictScanUseCase for PredictScanUseCaseImpl {
    async fn execute(&self, params: PredictScanParams) -> Result<ScanResult, ScanError> {
        let Some(classifier) = self.classifier.as_ref() else {
            self.logger
                .error("Prediction rejected: classifier model is not loaded");
            return Err(ScanError::ModelUnavailable);
        };

        let upload = params.upload.ok_or_else(|| {
            self.logger.warn("Prediction rejected: no file field");
            ScanError::MissingFile
        })?;

        let extension = ImageExtension::from_file_name(&upload.file_name).inspect_err(|_| {
            self.logger.warn(&format!(
                "Prediction rejected: invalid file name '{}'",
                upload.file_name
            ));
        })?;

        let requested = ScanFileName::generate(Utc::now(), extension);
        let stored = self.image_store.save(&requested, &upload.content).await?;
        self.logger.info(&format!(
            "Saved upload '{}' as {}",
            upload.file_name,
            stored.path.display()
        ));

        let remote_key = format!("scans/{}", stored.file_name);
        let image_url = self.storage.upload(&stored.path, &remote_key).await;
        if image_url.is_none() {
            self.logger.warn(&format!(
                "Continuing without remote copy of {}",
                stored.file_name
            ));
        }

        let probabilities = classifier.classify(&stored.path).await?;
        let classification = Classification::from_probabilities(&self.categories, &probabilities)
            .inspect_err(|_| {
                self.logger.error(&format!(
                    "Classifier returned {} probabilities for {} categories",
                    probabilities.len(),
                    self.categories.len()
                ));
            })?;

        let scan = ScanResult::new(NewScanResultProps {
            filename: stored.file_name,
            classification,
            image_url,
        });

        self.repository.insert(&scan).await.inspect_err(|e| {
            self.logger
                .error(&format!("Could not record scan {}: {}", scan.filename, e));
        })?;

        self.logger.info(&format!(
            "Scan {} classified as {} ({}%)",
            scan.filename, scan.result, scan.confidence
        ));
        Ok(scan)
    }
}
