use std::sync::Arc;

use async_trait::async_trait;

use business::domain::errors::RepositoryError;
use business::domain::logger::Logger;
use business::domain::scan::model::{ScanResult, history_window};
use business::domain::scan::repository::ScanHistoryRepository;

/// Primary-preferred history.
///
/// Writes go to the primary and fall through to the fallback on any failure,
/// once per request. Reads merge both backends so entries written during a
/// primary outage stay visible; when the primary cannot be read the fallback
/// alone answers.
pub struct ScanHistoryRepositoryWithFallback {
    pub primary: Arc<dyn ScanHistoryRepository>,
    pub fallback: Arc<dyn ScanHistoryRepository>,
    pub logger: Arc<dyn Logger>,
}

#[async_trait]
impl ScanHistoryRepository for ScanHistoryRepositoryWithFallback {
    async fn insert(&self, scan: &ScanResult) -> Result<(), RepositoryError> {
        let primary_error = match self.primary.insert(scan).await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        self.logger.warn(&format!(
            "Primary history write failed ({}), recording {} in local fallback",
            primary_error, scan.filename
        ));

        self.fallback.insert(scan).await.inspect_err(|e| {
            self.logger.error(&format!(
                "Local fallback history write failed for {}: {}",
                scan.filename, e
            ));
        })
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ScanResult>, RepositoryError> {
        let fallback = self.fallback.recent(limit).await;

        match self.primary.recent(limit).await {
            Ok(primary) => {
                let local = fallback.unwrap_or_else(|e| {
                    self.logger
                        .warn(&format!("Local fallback history unreadable: {}", e));
                    Vec::new()
                });
                let mut merged = history_window(primary.into_iter().chain(local));
                merged.truncate(limit);
                Ok(merged)
            }
            Err(primary_error) => match fallback {
                Ok(local) => {
                    self.logger.warn(&format!(
                        "Primary history unreadable ({}), serving local fallback",
                        primary_error
                    ));
                    Ok(local)
                }
                Err(fallback_error) => {
                    self.logger.error(&format!(
                        "No history backend readable: primary {}, fallback {}",
                        primary_error, fallback_error
                    ));
                    Err(RepositoryError::Unavailable)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::mock_logger;
    use chrono::{Duration, Utc};
    use mockall::mock;
    use std::collections::BTreeMap;

    mock! {
        pub HistoryRepo {}

        #[async_trait]
        impl ScanHistoryRepository for HistoryRepo {
            async fn insert(&self, scan: &ScanResult) -> Result<(), RepositoryError>;
            async fn recent(&self, limit: usize) -> Result<Vec<ScanResult>, RepositoryError>;
        }
    }

    fn scans(prefix: &'static str, range: std::ops::Range<i64>) -> Vec<ScanResult> {
        let start = Utc::now();
        range
            .map(|i| {
                ScanResult::from_repository(
                    format!("{prefix}_{i}.jpg"),
                    "Fresh".to_string(),
                    91.0,
                    BTreeMap::new(),
                    start + Duration::seconds(i),
                    None,
                )
            })
            .collect()
    }

    fn repository(
        primary: MockHistoryRepo,
        fallback: MockHistoryRepo,
    ) -> ScanHistoryRepositoryWithFallback {
        ScanHistoryRepositoryWithFallback {
            primary: Arc::new(primary),
            fallback: Arc::new(fallback),
            logger: mock_logger(),
        }
    }

    #[tokio::test]
    async fn should_write_to_primary_only_when_it_succeeds() {
        let mut primary = MockHistoryRepo::new();
        primary.expect_insert().times(1).returning(|_| Ok(()));
        let fallback = MockHistoryRepo::new();

        let result = repository(primary, fallback)
            .insert(&scans("scan", 0..1)[0])
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_write_to_fallback_when_primary_is_unavailable() {
        let mut primary = MockHistoryRepo::new();
        primary
            .expect_insert()
            .times(1)
            .returning(|_| Err(RepositoryError::Unavailable));
        let mut fallback = MockHistoryRepo::new();
        fallback.expect_insert().times(1).returning(|_| Ok(()));

        let result = repository(primary, fallback)
            .insert(&scans("scan", 0..1)[0])
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_write_to_fallback_when_primary_insert_fails() {
        let mut primary = MockHistoryRepo::new();
        primary
            .expect_insert()
            .returning(|_| Err(RepositoryError::DatabaseError));
        let mut fallback = MockHistoryRepo::new();
        fallback.expect_insert().times(1).returning(|_| Ok(()));

        let result = repository(primary, fallback)
            .insert(&scans("scan", 0..1)[0])
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_fail_when_both_backends_reject_write() {
        let mut primary = MockHistoryRepo::new();
        primary
            .expect_insert()
            .returning(|_| Err(RepositoryError::Unavailable));
        let mut fallback = MockHistoryRepo::new();
        fallback
            .expect_insert()
            .returning(|_| Err(RepositoryError::Persistence));

        let result = repository(primary, fallback)
            .insert(&scans("scan", 0..1)[0])
            .await;

        assert!(matches!(result, Err(RepositoryError::Persistence)));
    }

    #[tokio::test]
    async fn should_merge_both_backends_newest_first() {
        let mut primary = MockHistoryRepo::new();
        primary
            .expect_recent()
            .returning(|_| Ok(scans("primary", 0..15)));
        let mut fallback = MockHistoryRepo::new();
        fallback
            .expect_recent()
            .returning(|_| Ok(scans("local", 10..20)));

        let history = repository(primary, fallback).recent(20).await.unwrap();

        assert_eq!(history.len(), 20);
        assert!(
            history
                .windows(2)
                .all(|pair| pair[0].timestamp >= pair[1].timestamp)
        );
        assert!(history.iter().any(|s| s.filename.starts_with("local_")));
        assert!(history.iter().any(|s| s.filename.starts_with("primary_")));
    }

    #[tokio::test]
    async fn should_serve_fallback_when_primary_is_unreadable() {
        let mut primary = MockHistoryRepo::new();
        primary
            .expect_recent()
            .returning(|_| Err(RepositoryError::Unavailable));
        let mut fallback = MockHistoryRepo::new();
        fallback
            .expect_recent()
            .returning(|_| Ok(scans("local", 0..3)));

        let history = repository(primary, fallback).recent(20).await.unwrap();

        assert_eq!(history.len(), 3);
    }

    #[tokio::test]
    async fn should_serve_primary_when_fallback_is_unreadable() {
        let mut primary = MockHistoryRepo::new();
        primary
            .expect_recent()
            .returning(|_| Ok(scans("primary", 0..4)));
        let mut fallback = MockHistoryRepo::new();
        fallback
            .expect_recent()
            .returning(|_| Err(RepositoryError::Persistence));

        let history = repository(primary, fallback).recent(20).await.unwrap();

        assert_eq!(history.len(), 4);
        assert_eq!(history[0].filename, "primary_3.jpg");
    }

    #[tokio::test]
    async fn should_report_unavailable_when_no_backend_is_readable() {
        let mut primary = MockHistoryRepo::new();
        primary
            .expect_recent()
            .returning(|_| Err(RepositoryError::Unavailable));
        let mut fallback = MockHistoryRepo::new();
        fallback
            .expect_recent()
            .returning(|_| Err(RepositoryError::Persistence));

        let result = repository(primary, fallback).recent(20).await;

        assert!(matches!(result, Err(RepositoryError::Unavailable)));
    }
}
