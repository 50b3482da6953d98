use std::sync::Arc;

use poem_openapi::{OpenApi, payload::Json};

use business::domain::scan::use_cases::get_history::GetScanHistoryUseCase;
use business::domain::scan::use_cases::predict::{
    PredictScanParams, PredictScanUseCase, UploadedImage,
};

use crate::api::error::{ErrorResponse, IntoErrorResponse};
use crate::api::scan::dto::{PredictRequest, PredictionResponse, ScanHistoryEntryResponse};
use crate::api::tags::ApiTags;

pub struct ScanApi {
    predict_use_case: Arc<dyn PredictScanUseCase>,
    get_history_use_case: Arc<dyn GetScanHistoryUseCase>,
}

impl ScanApi {
    pub fn new(
        predict_use_case: Arc<dyn PredictScanUseCase>,
        get_history_use_case: Arc<dyn GetScanHistoryUseCase>,
    ) -> Self {
        Self {
            predict_use_case,
            get_history_use_case,
        }
    }
}

/// Egg scan API
///
/// Classifies uploaded egg images and lists recent results.
#[OpenApi]
impl ScanApi {
    /// Classify an egg image
    ///
    /// Stores the upload, runs the classifier and records the result in the
    /// scan history.
    #[oai(path = "/predict", method = "post", tag = "ApiTags::Scans")]
    async fn predict(&self, body: PredictRequest) -> PredictResponse {
        let upload = match body.file {
            Some(file) => {
                let file_name = file.file_name().unwrap_or_default().to_string();
                match file.into_vec().await {
                    Ok(content) => Some(UploadedImage { file_name, content }),
                    Err(e) => {
                        tracing::warn!(error = %e, "could not read uploaded file");
                        return PredictResponse::BadRequest(Json(ErrorResponse::new(
                            "ValidationError",
                            "Invalid file",
                        )));
                    }
                }
            }
            None => None,
        };

        match self
            .predict_use_case
            .execute(PredictScanParams { upload })
            .await
        {
            Ok(scan) => PredictResponse::Ok(Json(scan.into())),
            Err(err) => {
                let (status, json) = err.into_error_response();
                match status.as_u16() {
                    400 => PredictResponse::BadRequest(json),
                    422 => PredictResponse::UnprocessableEntity(json),
                    503 => PredictResponse::ServiceUnavailable(json),
                    _ => PredictResponse::InternalError(json),
                }
            }
        }
    }

    /// Recent scans
    ///
    /// Returns at most 20 scans, newest first.
    #[oai(path = "/history", method = "get", tag = "ApiTags::Scans")]
    async fn get_history(&self) -> GetHistoryResponse {
        match self.get_history_use_case.execute().await {
            Ok(scans) => {
                let responses: Vec<ScanHistoryEntryResponse> =
                    scans.into_iter().map(|s| s.into()).collect();
                GetHistoryResponse::Ok(Json(responses))
            }
            Err(err) => {
                let (_status, json) = err.into_error_response();
                GetHistoryResponse::InternalError(json)
            }
        }
    }
}

#[derive(poem_openapi::ApiResponse)]
#[oai(bad_request_handler = "missing_file_field")]
pub enum PredictResponse {
    #[oai(status = 200)]
    Ok(Json<PredictionResponse>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),
    #[oai(status = 422)]
    UnprocessableEntity(Json<ErrorResponse>),
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
    #[oai(status = 503)]
    ServiceUnavailable(Json<ErrorResponse>),
}

/// A body that is not multipart, or cannot be parsed as such, carries no file field.
fn missing_file_field(err: poem::Error) -> PredictResponse {
    tracing::warn!(error = %err, "predict request without a multipart body");
    PredictResponse::BadRequest(Json(ErrorResponse::new(
        "ValidationError",
        "No file field",
    )))
}

#[derive(poem_openapi::ApiResponse)]
pub enum GetHistoryResponse {
    #[oai(status = 200)]
    Ok(Json<Vec<ScanHistoryEntryResponse>>),
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}
