use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use business::domain::scan::errors::ScanError;
use business::domain::scan::services::{ScanImageStore, StoredImage};
use business::domain::scan::value_objects::ScanFileName;

const MAX_NAME_ATTEMPTS: u32 = 100;

/// Writes uploads into a local directory without ever replacing a file.
///
/// Names come from second-resolution timestamps, so a taken name is retried
/// with `_1`, `_2`, ... appended before the extension.
pub struct LocalScanImageStore {
    directory: PathBuf,
}

impl LocalScanImageStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn ensure_directory(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.directory)
    }
}

#[async_trait]
impl ScanImageStore for LocalScanImageStore {
    async fn save(
        &self,
        file_name: &ScanFileName,
        content: &[u8],
    ) -> Result<StoredImage, ScanError> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = match attempt {
                0 => file_name.clone(),
                n => file_name.with_suffix(n),
            };
            let path = self.directory.join(candidate.as_str());

            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    tracing::error!(error = %e, path = %path.display(), "could not create upload file");
                    return Err(ScanError::ImageStoreFailed);
                }
            };

            let written = match file.write_all(content).await {
                Ok(()) => file.flush().await,
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                tracing::error!(error = %e, path = %path.display(), "could not write upload file");
                let _ = tokio::fs::remove_file(&path).await;
                return Err(ScanError::ImageStoreFailed);
            }

            return Ok(StoredImage {
                file_name: candidate,
                path,
            });
        }

        tracing::error!(
            file_name = %file_name,
            "no free upload name after {} attempts",
            MAX_NAME_ATTEMPTS
        );
        Err(ScanError::ImageStoreFailed)
    }
}
