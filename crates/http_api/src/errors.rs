use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use points_app::{ApiError, AppError};
use tokio::task::JoinError;

/// JSON error body paired with the status it is sent with.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    body: ApiError,
}

impl HttpError {
    /// Blocking worker panicked or was cancelled before answering.
    pub fn worker_failed(err: JoinError) -> Self {
        tracing::error!(error = %err, "blocking request worker failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                message: "request worker failed".to_string(),
                code: Some("worker_failed".to_string()),
            },
        }
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        let body = ApiError::from(err);
        let status = StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), code = ?body.code, "{}", body.message);
        }
        Self { status, body }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
