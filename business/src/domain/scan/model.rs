use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, SubsecRound, Utc};

use super::errors::ScanError;
use super::value_objects::{CategoryLabels, ScanFileName};

/// Number of scans kept in, and returned from, the history.
pub const HISTORY_LIMIT: usize = 20;

/// Converts a model probability in `[0, 1]` into a percentage with two decimals.
pub fn to_percentage(probability: f32) -> f64 {
    if probability.is_nan() {
        return 0.0;
    }
    let percentage = f64::from(probability.clamp(0.0, 1.0)) * 100.0;
    (percentage * 100.0).round() / 100.0
}

/// Outcome of running the classifier over one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f64,
    pub probabilities: BTreeMap<String, f64>,
}

impl Classification {
    /// Maps a raw probability vector onto the configured labels.
    ///
    /// The winner is the first index holding the maximum value; NaN never wins.
    /// A vector whose length differs from the label count is rejected.
    pub fn from_probabilities(
        labels: &CategoryLabels,
        probabilities: &[f32],
    ) -> Result<Self, ScanError> {
        if probabilities.len() != labels.len() {
            return Err(ScanError::ClassificationFailed);
        }

        let (winner, _) = probabilities
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_nan())
            .fold(None, |best: Option<(usize, f32)>, (i, &p)| match best {
                Some((_, best_p)) if best_p >= p => best,
                _ => Some((i, p)),
            })
            .ok_or(ScanError::ClassificationFailed)?;

        let percentages: BTreeMap<String, f64> = labels
            .iter()
            .zip(probabilities)
            .map(|(label, &p)| (label.clone(), to_percentage(p)))
            .collect();

        let label = labels
            .iter()
            .nth(winner)
            .cloned()
            .ok_or(ScanError::ClassificationFailed)?;
        let confidence = to_percentage(probabilities[winner]);

        Ok(Self {
            label,
            confidence,
            probabilities: percentages,
        })
    }
}

/// The persisted record of one classification request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub filename: String,
    pub result: String,
    pub confidence: f64,
    pub probabilities: BTreeMap<String, f64>,
    pub timestamp: DateTime<Utc>,
    pub image_url: Option<String>,
}

pub struct NewScanResultProps {
    pub filename: ScanFileName,
    pub classification: Classification,
    pub image_url: Option<String>,
}

impl ScanResult {
    /// Timestamps are truncated to microseconds, the finest precision every
    /// history backend stores.
    pub fn new(props: NewScanResultProps) -> Self {
        Self {
            filename: props.filename.to_string(),
            result: props.classification.label,
            confidence: props.classification.confidence,
            probabilities: props.classification.probabilities,
            timestamp: Utc::now().trunc_subsecs(6),
            image_url: props.image_url,
        }
    }

    /// Constructor for data already persisted in the repository (no validation).
    pub fn from_repository(
        filename: String,
        result: String,
        confidence: f64,
        probabilities: BTreeMap<String, f64>,
        timestamp: DateTime<Utc>,
        image_url: Option<String>,
    ) -> Self {
        Self {
            filename,
            result,
            confidence,
            probabilities,
            timestamp,
            image_url,
        }
    }
}

/// Most recent scans first, one per filename, capped at [`HISTORY_LIMIT`].
///
/// When the same filename appears more than once the earliest occurrence in
/// `entries` wins, so callers list their preferred backend first.
pub fn history_window(entries: impl IntoIterator<Item = ScanResult>) -> Vec<ScanResult> {
    let mut entries: Vec<ScanResult> = entries.into_iter().collect();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut seen = HashSet::new();
    entries.retain(|e| seen.insert(e.filename.clone()));
    entries.truncate(HISTORY_LIMIT);
    entries
}
