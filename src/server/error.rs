use crate::FetcherError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error returned by the HTTP handlers
///
/// Request validation failures become `400` with the validation message as
/// `detail`; everything else is an internal failure.
#[derive(Debug)]
pub struct ApiError(FetcherError);

impl ApiError {
    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            FetcherError::Request(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent back to the caller
    pub fn detail(&self) -> String {
        match &self.0 {
            FetcherError::Request(e) => e.to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::info!("Rejected request: {}", self.0);
        }

        let body = Json(json!({
            "status": status.as_u16(),
            "detail": self.detail(),
        }));
        (status, body).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<FetcherError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
