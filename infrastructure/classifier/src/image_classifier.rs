use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use business::domain::scan::errors::ScanError;
use business::domain::scan::services::ImageClassifierService;

use crate::model_handle::ModelHandle;
use crate::preprocess::{load_rgb, to_input_tensor};

/// Classifier port backed by a loaded [`ModelHandle`]. Decoding and inference
/// run on the blocking thread pool.
pub struct TractImageClassifier {
    model: Arc<ModelHandle>,
}

impl TractImageClassifier {
    pub fn new(model: Arc<ModelHandle>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl ImageClassifierService for TractImageClassifier {
    async fn classify(&self, image_path: &Path) -> Result<Vec<f32>, ScanError> {
        let model = self.model.clone();
        let path = image_path.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let rgb = load_rgb(&path, model.input_size()).map_err(|e| {
                tracing::warn!(error = %e, path = %path.display(), "could not decode scan image");
                ScanError::UnreadableImage
            })?;

            model.classify(to_input_tensor(&rgb)).map_err(|e| {
                tracing::error!(error = %e, path = %path.display(), "inference failed");
                ScanError::ClassificationFailed
            })
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "inference task failed");
            ScanError::ClassificationFailed
        })?
    }
}
