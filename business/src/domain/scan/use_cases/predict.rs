use async_trait::async_trait;

use crate::domain::scan::errors::ScanError;
use crate::domain::scan::model::ScanResult;

/// An image received from the client, as named by the client.
pub struct UploadedImage {
    pub file_name: String,
    pub content: Vec<u8>,
}

pub struct PredictScanParams {
    /// `None` when the request carried no file field.
    pub upload: Option<UploadedImage>,
}

#[async_trait]
pub trait PredictScanUseCase: Send + Sync {
    async fn execute(&self, params: PredictScanParams) -> Result<ScanResult, ScanError>;
}
