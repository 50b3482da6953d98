use poem::http::StatusCode;
use poem_openapi::payload::Json;

use business::domain::errors::RepositoryError;
use business::domain::scan::errors::ScanError;

use crate::api::error::{ErrorResponse, IntoErrorResponse};

impl IntoErrorResponse for ScanError {
    fn into_error_response(self) -> (StatusCode, Json<ErrorResponse>) {
        let (status, name, message) = match &self {
            ScanError::MissingFile => (
                StatusCode::BAD_REQUEST,
                "ValidationError",
                "No file field",
            ),
            ScanError::InvalidFile => (
                StatusCode::BAD_REQUEST,
                "ValidationError",
                "Invalid file",
            ),
            ScanError::UnreadableImage => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UnreadableImage",
                "Unreadable image",
            ),
            ScanError::ModelUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "ServiceUnavailable",
                "Model not loaded",
            ),
            ScanError::ClassificationFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ClassificationError",
                "scan.classification_failed",
            ),
            ScanError::ImageStoreFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalError",
                "scan.image_store_failed",
            ),
            ScanError::Repository(RepositoryError::Unavailable) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalError",
                "Database not connected",
            ),
            ScanError::Repository(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalError",
                "repository.persistence",
            ),
        };

        (status, Json(ErrorResponse::new(name, message)))
    }
}
