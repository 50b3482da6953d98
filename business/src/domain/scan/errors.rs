#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("scan.missing_file")]
    MissingFile,
    #[error("scan.invalid_file")]
    InvalidFile,
    #[error("scan.model_unavailable")]
    ModelUnavailable,
    #[error("scan.unreadable_image")]
    UnreadableImage,
    #[error("scan.classification_failed")]
    ClassificationFailed,
    #[error("scan.image_store_failed")]
    ImageStoreFailed,
    #[error("repository.persistence")]
    Repository(#[from] crate::domain::errors::RepositoryError),
}
