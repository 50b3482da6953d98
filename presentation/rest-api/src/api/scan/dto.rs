use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use poem_openapi::types::multipart::Upload;
use poem_openapi::{Multipart, Object};

use business::domain::scan::model::ScanResult;

/// Multipart body of a prediction request.
#[derive(Debug, Multipart)]
pub struct PredictRequest {
    /// Egg image (jpg, jpeg, png or bmp)
    pub file: Option<Upload>,
}

/// Outcome of a single classification.
#[derive(Debug, Clone, Object)]
pub struct PredictionResponse {
    /// Winning category label
    pub result: String,
    /// Probability of the winning category, 0 to 100
    pub confidence: f64,
    /// Probability of every category, 0 to 100
    pub probs: BTreeMap<String, f64>,
    /// Public URL of the stored image, null when the upload failed
    pub image_url: Option<String>,
}

impl From<ScanResult> for PredictionResponse {
    fn from(scan: ScanResult) -> Self {
        Self {
            result: scan.result,
            confidence: scan.confidence,
            probs: scan.probabilities,
            image_url: scan.image_url,
        }
    }
}

/// A past classification.
#[derive(Debug, Clone, Object)]
pub struct ScanHistoryEntryResponse {
    /// Generated image name
    pub filename: String,
    pub result: String,
    pub confidence: f64,
    pub probs: BTreeMap<String, f64>,
    /// Capture time (UTC)
    pub timestamp: DateTime<Utc>,
    pub image_url: Option<String>,
}

impl From<ScanResult> for ScanHistoryEntryResponse {
    fn from(scan: ScanResult) -> Self {
        Self {
            filename: scan.filename,
            result: scan.result,
            confidence: scan.confidence,
            probs: scan.probabilities,
            timestamp: scan.timestamp,
            image_url: scan.image_url,
        }
    }
}
