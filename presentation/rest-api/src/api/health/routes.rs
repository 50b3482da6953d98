use chrono::Utc;
use poem_openapi::{Object, OpenApi, payload::Json};
use serde::{Deserialize, Serialize};

use crate::api::tags::ApiTags;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct HealthCheckResponse {
    /// Service status
    pub status: String,
    /// Current server timestamp
    pub timestamp: String,
    /// Service version
    pub version: String,
    /// Whether the classifier model was loaded at startup
    pub model_loaded: bool,
}

/// Health API for monitoring and infrastructure checks
pub struct Api {
    model_loaded: bool,
}

impl Api {
    pub fn new(model_loaded: bool) -> Self {
        Self { model_loaded }
    }
}

#[OpenApi]
impl Api {
    /// Health check endpoint
    ///
    /// Returns the current status of the service. The service reports
    /// "healthy" even without a model; predictions then answer 503.
    ///
    /// ## Response
    /// - `status`: "healthy" if service is running
    /// - `timestamp`: Current server timestamp in ISO 8601 format
    /// - `version`: Service version from Cargo.toml
    /// - `model_loaded`: false when running in degraded mode
    #[oai(path = "/health", method = "get", tag = "ApiTags::Health")]
    async fn health_check(&self) -> Json<HealthCheckResponse> {
        Json(HealthCheckResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            model_loaded: self.model_loaded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poem::test::TestClient;
    use poem::{Route, http::StatusCode};
    use poem_openapi::OpenApiService;

    #[tokio::test]
    async fn should_report_degraded_mode() {
        let service = OpenApiService::new(Api::new(false), "Egg Scanner", "test");
        let client = TestClient::new(Route::new().nest("/api", service));

        let response = client.get("/api/health").send().await;

        response.assert_status(StatusCode::OK);
        let json = response.json().await;
        let body = json.value().object();
        body.get("status").assert_string("healthy");
        body.get("model_loaded").assert_bool(false);
    }
}
