use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::errors::ScanError;
use super::value_objects::ScanFileName;

/// Service port for the loaded image classifier.
///
/// Returns one probability per configured category, in model output order.
#[async_trait]
pub trait ImageClassifierService: Send + Sync {
    async fn classify(&self, image_path: &Path) -> Result<Vec<f32>, ScanError>;
}

/// Service port for the remote object store.
///
/// A single upload attempt. Failures are reported as `None`, never as errors,
/// so a missing copy never blocks a classification.
#[async_trait]
pub trait ImageStorageService: Send + Sync {
    async fn upload(&self, local_path: &Path, remote_key: &str) -> Option<String>;
}

/// An uploaded image written to local disk.
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Final name, possibly suffixed when the requested one was taken.
    pub file_name: ScanFileName,
    pub path: PathBuf,
}

/// Service port for the local upload directory.
#[async_trait]
pub trait ScanImageStore: Send + Sync {
    async fn save(&self, file_name: &ScanFileName, content: &[u8])
    -> Result<StoredImage, ScanError>;
}
