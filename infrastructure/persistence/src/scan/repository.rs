use std::sync::Arc;

use async_trait::async_trait;
use sqlx::types::Json;

use business::domain::errors::RepositoryError;
use business::domain::scan::model::ScanResult;
use business::domain::scan::repository::ScanHistoryRepository;

use super::entity::ScanResultEntity;
use crate::db::PrimaryConnection;

/// Primary history backend. Reports `Unavailable` when no connection can be
/// obtained and `DatabaseError` when a statement fails.
pub struct ScanHistoryRepositoryPostgres {
    connection: Arc<PrimaryConnection>,
}

impl ScanHistoryRepositoryPostgres {
    pub fn new(connection: Arc<PrimaryConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl ScanHistoryRepository for ScanHistoryRepositoryPostgres {
    async fn insert(&self, scan: &ScanResult) -> Result<(), RepositoryError> {
        let pool = self
            .connection
            .pool()
            .await
            .ok_or(RepositoryError::Unavailable)?;

        sqlx::query(
            r#"INSERT INTO scan_history (filename, result, confidence, probs, scanned_at, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(&scan.filename)
        .bind(&scan.result)
        .bind(scan.confidence)
        .bind(Json(scan.probabilities.clone()))
        .bind(scan.timestamp)
        .bind(&scan.image_url)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, filename = %scan.filename, "scan_history insert failed");
            RepositoryError::DatabaseError
        })?;

        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ScanResult>, RepositoryError> {
        let pool = self
            .connection
            .pool()
            .await
            .ok_or(RepositoryError::Unavailable)?;

        let entities = sqlx::query_as::<_, ScanResultEntity>(
            "SELECT filename, result, confidence, probs, scanned_at, image_url FROM scan_history ORDER BY scanned_at DESC LIMIT $1",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "scan_history query failed");
            RepositoryError::DatabaseError
        })?;

        Ok(entities.into_iter().map(|e| e.into_domain()).collect())
    }
}
