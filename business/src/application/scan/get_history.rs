use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::logger::Logger;
use crate::domain::scan::errors::ScanError;
use crate::domain::scan::model::{HISTORY_LIMIT, ScanResult, history_window};
use crate::domain::scan::repository::ScanHistoryRepository;
use crate::domain::scan::use_cases::get_history::GetScanHistoryUseCase;

pub struct GetScanHistoryUseCaseImpl {
    pub repository: Arc<dyn ScanHistoryRepository>,
    pub logger: Arc<dyn Logger>,
}

#[async_trait]
impl GetScanHistoryUseCase for GetScanHistoryUseCaseImpl {
    async fn execute(&self) -> Result<Vec<ScanResult>, ScanError> {
        self.logger.info("Fetching scan history");
        let scans = self.repository.recent(HISTORY_LIMIT).await?;
        let window = history_window(scans);
        self.logger
            .info(&format!("Found {} scans in history", window.len()));
        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::RepositoryError;
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

    mock! {
        pub Log {}

        impl Logger for Log {
            fn info(&self, message: &str);
            fn warn(&self, message: &str);
            fn error(&self, message: &str);
            fn debug(&self, message: &str);
        }
    }

    fn mock_logger() -> Arc<dyn Logger> {
        let mut logger = MockLog::new();
        logger.expect_info().returning(|_| ());
        logger.expect_warn().returning(|_| ());
        logger.expect_error().returning(|_| ());
        logger.expect_debug().returning(|_| ());
        Arc::new(logger)
    }

    fn scans(count: i64) -> Vec<ScanResult> {
        let start = Utc::now();
        (0..count)
            .map(|i| {
                ScanResult::from_repository(
                    format!("scan_{i}.jpg"),
                    "Spoiled".to_string(),
                    88.5,
                    BTreeMap::from([
                        ("Fresh".to_string(), 10.0),
                        ("Invalid".to_string(), 1.5),
                        ("Spoiled".to_string(), 88.5),
                    ]),
                    start + Duration::seconds(i),
                    None,
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn should_return_newest_scans_first() {
        let mut repo = MockHistoryRepo::new();
        repo.expect_recent()
            .withf(|limit| *limit == HISTORY_LIMIT)
            .returning(|_| Ok(scans(3)));

        let use_case = GetScanHistoryUseCaseImpl {
            repository: Arc::new(repo),
            logger: mock_logger(),
        };

        let history = use_case.execute().await.unwrap();

        assert_eq!(history.len(), 3);
        assert_eq!(history[0].filename, "scan_2.jpg");
        assert_eq!(history[2].filename, "scan_0.jpg");
    }

    #[tokio::test]
    async fn should_never_return_more_than_history_limit() {
        let mut repo = MockHistoryRepo::new();
        repo.expect_recent().returning(|_| Ok(scans(35)));

        let use_case = GetScanHistoryUseCaseImpl {
            repository: Arc::new(repo),
            logger: mock_logger(),
        };

        let history = use_case.execute().await.unwrap();

        assert_eq!(history.len(), HISTORY_LIMIT);
        assert!(
            history
                .windows(2)
                .all(|pair| pair[0].timestamp >= pair[1].timestamp)
        );
    }

    #[tokio::test]
    async fn should_return_error_when_history_is_unavailable() {
        let mut repo = MockHistoryRepo::new();
        repo.expect_recent()
            .returning(|_| Err(RepositoryError::Unavailable));

        let use_case = GetScanHistoryUseCaseImpl {
            repository: Arc::new(repo),
            logger: mock_logger(),
        };

        let result = use_case.execute().await;

        assert!(matches!(
            result.unwrap_err(),
            ScanError::Repository(RepositoryError::Unavailable)
        ));
    }
}
