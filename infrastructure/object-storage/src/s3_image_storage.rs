use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectStorePath;
use object_store::{ObjectStore, PutPayload};
use thiserror::Error;

use business::domain::scan::services::ImageStorageService;

#[derive(Error, Debug)]
pub enum StorageConfigError {
    #[error("storage.client_error: {0}")]
    Client(#[from] object_store::Error),
}

/// Credentials and target bucket for scan uploads.
#[derive(Debug, Clone, Default)]
pub struct S3Settings {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Option<String>,
    pub bucket: Option<String>,
}

impl S3Settings {
    pub fn is_complete(&self) -> bool {
        [
            &self.access_key_id,
            &self.secret_access_key,
            &self.region,
            &self.bucket,
        ]
        .iter()
        .all(|value| value.as_deref().is_some_and(|v| !v.is_empty()))
    }
}

/// Public HTTPS URL of an object in a bucket.
pub fn public_object_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
}

/// Uploads scan images and hands back their public URL.
///
/// Without complete settings the storage is disabled and every upload
/// yields `None`; failures are logged and never surface to the caller.
pub struct S3ImageStorage {
    store: Option<Arc<dyn ObjectStore>>,
    bucket: String,
    region: String,
}

impl S3ImageStorage {
    pub fn from_settings(settings: &S3Settings) -> Result<Self, StorageConfigError> {
        if !settings.is_complete() {
            tracing::warn!("S3 credentials incomplete, scan images will not be uploaded");
            return Ok(Self::disabled());
        }

        let bucket = settings.bucket.clone().unwrap_or_default();
        let region = settings.region.clone().unwrap_or_default();

        let store = AmazonS3Builder::new()
            .with_bucket_name(&bucket)
            .with_region(&region)
            .with_access_key_id(settings.access_key_id.clone().unwrap_or_default())
            .with_secret_access_key(settings.secret_access_key.clone().unwrap_or_default())
            .build()?;

        Ok(Self::with_store(Arc::new(store), bucket, region))
    }

    pub fn with_store(store: Arc<dyn ObjectStore>, bucket: String, region: String) -> Self {
        Self {
            store: Some(store),
            bucket,
            region,
        }
    }

    pub fn disabled() -> Self {
        Self {
            store: None,
            bucket: String::new(),
            region: String::new(),
        }
    }
}

#[async_trait]
impl ImageStorageService for S3ImageStorage {
    async fn upload(&self, local_path: &Path, remote_key: &str) -> Option<String> {
        let store = self.store.as_ref()?;

        let bytes = match tokio::fs::read(local_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, path = %local_path.display(), "could not read scan for upload");
                return None;
            }
        };

        let object_path = ObjectStorePath::from(remote_key);
        if let Err(e) = store.put(&object_path, PutPayload::from(bytes)).await {
            tracing::error!(error = %e, key = remote_key, "S3 upload failed");
            return None;
        }

        let url = public_object_url(&self.bucket, &self.region, remote_key);
        tracing::info!(url = %url, "scan uploaded");
        Some(url)
    }
}
