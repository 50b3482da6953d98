use std::env;
use std::time::Duration;

use business::domain::scan::value_objects::CategoryLabels;
use object_storage::s3_image_storage::{S3Settings, public_object_url};

const MODEL_ARTIFACT_KEY: &str = "egg_model.onnx";

/// Where the classifier comes from and how its output is labelled.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// `None` when neither MODEL_URL nor the bucket location is known.
    pub url: Option<String>,
    pub fetch_timeout: Duration,
    pub categories: CategoryLabels,
}

impl ModelConfig {
    /// Environment variables:
    /// - MODEL_URL (default: the model artifact in the scan bucket)
    /// - MODEL_FETCH_TIMEOUT_SECS (default: 120)
    /// - CLASS_NAMES: comma-separated labels in model output order
    ///   (default: "Fresh,Invalid,Spoiled")
    pub fn from_env(storage: &S3Settings) -> anyhow::Result<Self> {
        let url = env::var("MODEL_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| default_model_url(storage));

        let fetch_timeout = Duration::from_secs(
            env::var("MODEL_FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(120),
        );

        let categories: CategoryLabels = match env::var("CLASS_NAMES") {
            Ok(names) => names
                .parse()
                .map_err(|e| anyhow::anyhow!("CLASS_NAMES is invalid: {}", e))?,
            Err(_) => CategoryLabels::default(),
        };

        Ok(Self {
            url,
            fetch_timeout,
            categories,
        })
    }
}

fn default_model_url(storage: &S3Settings) -> Option<String> {
    let bucket = storage.bucket.as_deref()?;
    let region = storage.region.as_deref()?;
    Some(public_object_url(bucket, region, MODEL_ARTIFACT_KEY))
}
