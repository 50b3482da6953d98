use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::errors::ScanError;

static UNSAFE_FILE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("static pattern is valid"));

/// Image formats accepted for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageExtension {
    Jpg,
    Jpeg,
    Png,
    Bmp,
}

impl ImageExtension {
    /// Extracts the extension after the last dot and checks it against the allow-list.
    pub fn from_file_name(file_name: &str) -> Result<Self, ScanError> {
        if file_name.trim().is_empty() {
            return Err(ScanError::InvalidFile);
        }

        let (_, extension) = file_name.rsplit_once('.').ok_or(ScanError::InvalidFile)?;
        extension.parse().map_err(|_| ScanError::InvalidFile)
    }
}

impl std::fmt::Display for ImageExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageExtension::Jpg => write!(f, "jpg"),
            ImageExtension::Jpeg => write!(f, "jpeg"),
            ImageExtension::Png => write!(f, "png"),
            ImageExtension::Bmp => write!(f, "bmp"),
        }
    }
}

impl std::str::FromStr for ImageExtension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" => Ok(ImageExtension::Jpg),
            "jpeg" => Ok(ImageExtension::Jpeg),
            "png" => Ok(ImageExtension::Png),
            "bmp" => Ok(ImageExtension::Bmp),
            _ => Err(format!("Invalid image extension: {}", s)),
        }
    }
}

/// Strips anything that could escape the upload directory or confuse a shell.
///
/// Path separators become word breaks, whitespace runs collapse into `_`,
/// every character outside `[A-Za-z0-9_.-]` is dropped and leading or
/// trailing dots and underscores are trimmed.
pub fn sanitize_file_name(raw: &str) -> String {
    let spaced = raw.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_FILE_NAME_CHARS.replace_all(&joined, "");
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Name under which an uploaded scan image is stored, locally and remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFileName(String);

impl ScanFileName {
    /// Builds `scan_<YYYYmmdd_HHMMSS>.<ext>` from a UTC capture time.
    pub fn generate(captured_at: DateTime<Utc>, extension: ImageExtension) -> Self {
        let raw = format!(
            "scan_{}.{}",
            captured_at.format("%Y%m%d_%H%M%S"),
            extension
        );
        Self(sanitize_file_name(&raw))
    }

    /// Disambiguates a name already taken: `scan_x.jpg` becomes `scan_x_<n>.jpg`.
    pub fn with_suffix(&self, n: u32) -> Self {
        match self.0.rsplit_once('.') {
            Some((stem, extension)) => Self(format!("{}_{}.{}", stem, n, extension)),
            None => Self(format!("{}_{}", self.0, n)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScanFileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered category labels, one per classifier output slot.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryLabels(Vec<String>);

impl CategoryLabels {
    pub fn new(labels: Vec<String>) -> Result<Self, String> {
        let labels: Vec<String> = labels
            .into_iter()
            .map(|l| l.trim().to_string())
            .collect();

        if labels.is_empty() || labels.iter().any(|l| l.is_empty()) {
            return Err("Category labels cannot be empty".to_string());
        }

        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(format!("Duplicated category label: {}", label));
            }
        }

        Ok(Self(labels))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl Default for CategoryLabels {
    fn default() -> Self {
        Self(vec![
            "Fresh".to_string(),
            "Invalid".to_string(),
            "Spoiled".to_string(),
        ])
    }
}

impl std::str::FromStr for CategoryLabels {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.split(',').map(|l| l.to_string()).collect())
    }
}
