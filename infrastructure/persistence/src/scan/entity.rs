use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use business::domain::scan::model::ScanResult;

/// Row of the `scan_history` table. The surrogate `id` is never selected.
#[derive(Debug, FromRow)]
pub struct ScanResultEntity {
    pub filename: String,
    pub result: String,
    pub confidence: f64,
    pub probs: Json<BTreeMap<String, f64>>,
    pub scanned_at: DateTime<Utc>,
    pub image_url: Option<String>,
}

impl ScanResultEntity {
    pub fn into_domain(self) -> ScanResult {
        ScanResult::from_repository(
            self.filename,
            self.result,
            self.confidence,
            self.probs.0,
            self.scanned_at,
            self.image_url,
        )
    }
}

/// Entry of the local fallback history file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub filename: String,
    pub result: String,
    pub confidence: f64,
    pub probs: BTreeMap<String, f64>,
    pub timestamp: DateTime<Utc>,
    pub image_url: Option<String>,
}

impl ScanRecord {
    pub fn into_domain(self) -> ScanResult {
        ScanResult::from_repository(
            self.filename,
            self.result,
            self.confidence,
            self.probs,
            self.timestamp,
            self.image_url,
        )
    }
}

impl From<&ScanResult> for ScanRecord {
    fn from(scan: &ScanResult) -> Self {
        Self {
            filename: scan.filename.clone(),
            result: scan.result.clone(),
            confidence: scan.confidence,
            probs: scan.probabilities.clone(),
            timestamp: scan.timestamp,
            image_url: scan.image_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::SubsecRound;

    #[test]
    fn should_serialize_record_with_wire_field_names() {
        let record = ScanRecord {
            filename: "scan_20250309_070501.jpg".to_string(),
            result: "Fresh".to_string(),
            confidence: 91.0,
            probs: BTreeMap::from([("Fresh".to_string(), 91.0)]),
            timestamp: Utc::now(),
            image_url: None,
        };

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["probs"]["Fresh"], 91.0);
        assert!(json["image_url"].is_null());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn should_round_trip_scan_through_record_json() {
        let scan = ScanResult::from_repository(
            "scan_20250309_070501.png".to_string(),
            "Spoiled".to_string(),
            73.21,
            BTreeMap::from([
                ("Fresh".to_string(), 20.12),
                ("Invalid".to_string(), 6.67),
                ("Spoiled".to_string(), 73.21),
            ]),
            Utc::now().trunc_subsecs(6),
            Some("https://eggs.s3.eu-west-1.amazonaws.com/scans/scan_20250309_070501.png".to_string()),
        );

        let json = serde_json::to_string(&ScanRecord::from(&scan)).unwrap();
        let restored: ScanRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.into_domain(), scan);
    }
}
