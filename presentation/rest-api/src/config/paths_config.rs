use std::env;
use std::path::PathBuf;

/// Local filesystem locations.
#[derive(Debug, Clone)]
pub struct PathsConfig {
    pub upload_folder: PathBuf,
    pub history_path: PathBuf,
    pub static_dir: PathBuf,
}

impl PathsConfig {
    /// Environment variables:
    /// - UPLOAD_FOLDER (default: "uploads")
    /// - HISTORY_PATH (default: "history.json")
    /// - STATIC_DIR (default: "static")
    pub fn from_env() -> Self {
        let path = |name: &str, default: &str| {
            PathBuf::from(env::var(name).unwrap_or_else(|_| default.to_string()))
        };

        Self {
            upload_folder: path("UPLOAD_FOLDER", "uploads"),
            history_path: path("HISTORY_PATH", "history.json"),
            static_dir: path("STATIC_DIR", "static"),
        }
    }
}
