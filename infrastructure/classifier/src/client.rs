use std::io::Write;
use std::time::Duration;

use reqwest::Client;
use tempfile::NamedTempFile;

use crate::model_handle::ModelLoadError;

/// HTTP client for the serialized model artifact.
pub struct ModelArtifactClient {
    pub client: Client,
    pub url: String,
}

impl ModelArtifactClient {
    pub fn new(url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self { client, url }
    }

    /// Downloads the artifact into a temporary file that is deleted on drop.
    pub async fn download(&self) -> Result<NamedTempFile, ModelLoadError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(ModelLoadError::Download)?;

        let bytes = response.bytes().await.map_err(ModelLoadError::Download)?;
        if bytes.is_empty() {
            return Err(ModelLoadError::InvalidArtifact(
                "downloaded model is empty".to_string(),
            ));
        }

        let mut file = tempfile::Builder::new()
            .prefix("egg_model_")
            .suffix(".onnx")
            .tempfile()?;
        file.write_all(&bytes)?;
        file.flush()?;

        tracing::debug!(
            bytes = bytes.len(),
            path = %file.path().display(),
            "model artifact downloaded"
        );
        Ok(file)
    }
}
