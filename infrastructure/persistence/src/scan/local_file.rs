use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use business::domain::errors::RepositoryError;
use business::domain::scan::model::{HISTORY_LIMIT, ScanResult, history_window};
use business::domain::scan::repository::ScanHistoryRepository;

use super::entity::ScanRecord;

/// Fallback history kept as a JSON array, most recent first, never longer than
/// [`HISTORY_LIMIT`].
///
/// Every read-modify-write runs under an in-process mutex and an exclusive
/// lock on `<file>.lock`, and lands through a temporary file renamed over the
/// target, so a crash leaves either the old or the new list on disk.
pub struct ScanHistoryRepositoryLocalFile {
    path: PathBuf,
    guard: Arc<Mutex<()>>,
}

impl ScanHistoryRepositoryLocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Arc::new(Mutex::new(())),
        }
    }

    /// Creates the file holding an empty list when it does not exist yet.
    pub fn ensure_initialized(&self) -> Result<(), RepositoryError> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = parent_dir(&self.path) {
            fs::create_dir_all(parent).map_err(|e| io_failure("create directory", &e))?;
        }
        with_file_lock(&lock_path(&self.path), true, || {
            if self.path.exists() {
                return Ok(());
            }
            write_records(&self.path, &[])
        })
    }

    async fn run_blocking<T, F>(&self, operation: F) -> Result<T, RepositoryError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, RepositoryError> + Send + 'static,
    {
        let _guard = self.guard.lock().await;
        tokio::task::spawn_blocking(operation).await.map_err(|e| {
            tracing::error!(error = %e, "fallback history task failed");
            RepositoryError::Persistence
        })?
    }
}

#[async_trait]
impl ScanHistoryRepository for ScanHistoryRepositoryLocalFile {
    async fn insert(&self, scan: &ScanResult) -> Result<(), RepositoryError> {
        let path = self.path.clone();
        let record = ScanRecord::from(scan);

        self.run_blocking(move || {
            with_file_lock(&lock_path(&path), true, || {
                let mut records = read_records(&path)?;
                records.insert(0, record);
                records.truncate(HISTORY_LIMIT);
                write_records(&path, &records)
            })
        })
        .await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ScanResult>, RepositoryError> {
        let path = self.path.clone();

        let records = self
            .run_blocking(move || with_file_lock(&lock_path(&path), false, || read_records(&path)))
            .await?;

        let mut scans = history_window(records.into_iter().map(ScanRecord::into_domain));
        scans.truncate(limit);
        Ok(scans)
    }
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn io_failure(operation: &str, error: &std::io::Error) -> RepositoryError {
    tracing::error!(error = %error, operation, "fallback history I/O failed");
    RepositoryError::Persistence
}

/// Holds an OS file lock on `lock_path` for the duration of `operation`.
/// The lock is released when the lock file handle is dropped.
fn with_file_lock<T>(
    lock_path: &Path,
    exclusive: bool,
    operation: impl FnOnce() -> Result<T, RepositoryError>,
) -> Result<T, RepositoryError> {
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path)
        .map_err(|e| io_failure("open lock file", &e))?;

    let locked = if exclusive {
        lock_file.lock()
    } else {
        lock_file.lock_shared()
    };
    locked.map_err(|e| io_failure("acquire lock", &e))?;

    operation()
}

fn read_records(path: &Path) -> Result<Vec<ScanRecord>, RepositoryError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_failure("read history file", &e)),
    };

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&content).map_err(|e| {
        tracing::error!(error = %e, path = %path.display(), "fallback history file is corrupt");
        RepositoryError::Persistence
    })
}

fn write_records(path: &Path, records: &[ScanRecord]) -> Result<(), RepositoryError> {
    let directory = parent_dir(path).unwrap_or_else(|| Path::new("."));
    let temp = NamedTempFile::new_in(directory).map_err(|e| io_failure("create temp file", &e))?;

    {
        let mut writer = BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, records).map_err(|e| {
            tracing::error!(error = %e, "could not serialize fallback history");
            RepositoryError::Persistence
        })?;
        writer
            .flush()
            .map_err(|e| io_failure("write history file", &e))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| io_failure("sync history file", &e))?;

    temp.persist(path)
        .map_err(|e| io_failure("replace history file", &e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, SubsecRound, Utc};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn scan(filename: &str, offset_secs: i64) -> ScanResult {
        ScanResult::from_repository(
            filename.to_string(),
            "Fresh".to_string(),
            91.0,
            BTreeMap::from([
                ("Fresh".to_string(), 91.0),
                ("Invalid".to_string(), 3.0),
                ("Spoiled".to_string(), 6.0),
            ]),
            Utc::now().trunc_subsecs(6) + Duration::seconds(offset_secs),
            None,
        )
    }

    #[test]
    fn should_initialize_missing_file_with_empty_list() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");
        let repository = ScanHistoryRepositoryLocalFile::new(&path);

        repository.ensure_initialized().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "[]");
    }

    #[test]
    fn should_not_overwrite_existing_history_on_initialize() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, r#"[{"filename":"a.jpg","result":"Fresh","confidence":1.0,"probs":{},"timestamp":"2025-01-01T00:00:00Z","image_url":null}]"#).unwrap();
        let repository = ScanHistoryRepositoryLocalFile::new(&path);

        repository.ensure_initialized().unwrap();

        assert!(fs::read_to_string(&path).unwrap().contains("a.jpg"));
    }

    #[tokio::test]
    async fn should_read_back_identical_scan() {
        let dir = tempdir().unwrap();
        let repository = ScanHistoryRepositoryLocalFile::new(dir.path().join("history.json"));
        let mut original = scan("scan_20250309_070501.jpg", 0);
        original.image_url =
            Some("https://eggs.s3.eu-west-1.amazonaws.com/scans/scan_20250309_070501.jpg".to_string());

        repository.insert(&original).await.unwrap();
        let history = repository.recent(HISTORY_LIMIT).await.unwrap();

        assert_eq!(history, vec![original]);
    }

    #[tokio::test]
    async fn should_keep_only_most_recent_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        let repository = ScanHistoryRepositoryLocalFile::new(&path);

        for i in 0..25 {
            repository
                .insert(&scan(&format!("scan_{i}.jpg"), i))
                .await
                .unwrap();
        }

        let history = repository.recent(HISTORY_LIMIT).await.unwrap();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].filename, "scan_24.jpg");
        assert_eq!(history[19].filename, "scan_5.jpg");

        let on_disk: Vec<ScanRecord> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.len(), HISTORY_LIMIT);
        assert_eq!(on_disk[0].filename, "scan_24.jpg");
    }

    #[tokio::test]
    async fn should_not_lose_entries_under_concurrent_writers() {
        let dir = tempdir().unwrap();
        let repository = Arc::new(ScanHistoryRepositoryLocalFile::new(
            dir.path().join("history.json"),
        ));

        let writers: Vec<_> = (0..10)
            .map(|i| {
                let repository = repository.clone();
                tokio::spawn(async move {
                    repository
                        .insert(&scan(&format!("scan_{i}.jpg"), i))
                        .await
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        assert_eq!(repository.recent(HISTORY_LIMIT).await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn should_treat_missing_file_as_empty_history() {
        let dir = tempdir().unwrap();
        let repository = ScanHistoryRepositoryLocalFile::new(dir.path().join("absent.json"));

        assert!(repository.recent(HISTORY_LIMIT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_refuse_to_overwrite_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{ not json").unwrap();
        let repository = ScanHistoryRepositoryLocalFile::new(&path);

        let result = repository.insert(&scan("scan_1.jpg", 0)).await;

        assert!(matches!(result, Err(RepositoryError::Persistence)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }
}
