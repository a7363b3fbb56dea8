//! # Error Handling Middleware
//!
//! Maps the classified `HealthError` onto HTTP status codes with a JSON
//! `{"error": message}` body, so every handler can return
//! `Result<_, AppError>` and use `?` on domain and store results alike.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;
use vitalog_core::errors::HealthError;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use vitalog_api::middleware::error_handling::AppError;
/// use vitalog_core::errors::HealthError;
///
/// async fn handler(name: String) -> Result<Json<String>, AppError> {
///     if name.trim().is_empty() {
///         return Err(AppError(HealthError::Validation("name is required".to_string())));
///     }
///     Ok(Json(name))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub HealthError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            HealthError::NotFound(_) => StatusCode::NOT_FOUND,
            HealthError::Validation(_) | HealthError::Protocol(_) => StatusCode::BAD_REQUEST,
            HealthError::Delivery(_) => StatusCode::BAD_GATEWAY,
            HealthError::Data(_) | HealthError::Database(_) | HealthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl From<HealthError> for AppError {
    fn from(err: HealthError) -> Self {
        AppError(err)
    }
}

/// Store and transport failures surface as database errors.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(HealthError::Database(err))
    }
}
