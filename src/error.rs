use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures inside the request pipeline. Anything that reaches the chat
/// handler as a `ChatError` becomes an `error` reply carrying its text.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid {field} coordinate from geocoder: {value:?}")]
    InvalidCoordinate { field: &'static str, value: String },
}

/// Conditions surfaced to the caller as an HTTP status instead of a reply body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidPrompt(String),

    /// Body that could not be read as a chat request.
    #[error("{detail}")]
    InvalidBody { status: StatusCode, detail: String },

    #[error("No places found")]
    NotFound,

    #[error("Too many requests")]
    TooManyRequests,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPrompt(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidBody { status, .. } => *status,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
