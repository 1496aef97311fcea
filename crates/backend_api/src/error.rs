use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use models::ValidationError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid request body: {}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn expense_not_found(id: u64) -> Self {
        ApiError::NotFound(format!("Expense {} not found", id))
    }

    pub fn budget_not_found(id: u64) -> Self {
        ApiError::NotFound(format!("Budget {} not found", id))
    }

    pub fn category_not_found(id: u64) -> Self {
        ApiError::NotFound(format!("Category {} not found", id))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) | ApiError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::IoError(_)
            | ApiError::JsonError(_)
            | ApiError::CsvError(_)
            | ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = match &self {
            ApiError::Validation(err) => json!({
                "error": self.to_string(),
                "field": err.field(),
            }),
            _ => json!({
                "error": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
