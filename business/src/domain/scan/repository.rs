use async_trait::async_trait;

use crate::domain::errors::RepositoryError;

use super::model::ScanResult;

#[async_trait]
pub trait ScanHistoryRepository: Send + Sync {
    async fn insert(&self, scan: &ScanResult) -> Result<(), RepositoryError>;
    /// Up to `limit` scans, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<ScanResult>, RepositoryError>;
}
