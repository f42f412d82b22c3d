//! Gateway error type.
//!
//! Every handler returns `Result<HttpResponse, ApiError>`; actix calls
//! `ResponseError::error_response` on failure, so this is the single place
//! where error bodies get their shape.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthenticated,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Not implemented in functions emulator")]
    Unimplemented { path: String },

    #[error(transparent)]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    pub fn required(field: &str) -> Self {
        ApiError::Validation(format!("{} required", field))
    }

    pub fn not_found() -> Self {
        ApiError::NotFound("Not found")
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unimplemented { .. } => StatusCode::NOT_IMPLEMENTED,
            ApiError::Store(_) | ApiError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            ApiError::Unimplemented { path } => json!({
                "error": self.to_string(),
                "path": path,
            }),
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                log::error!("Unhandled error in functions: {:?}", self);
                let message = self.to_string();
                json!({
                    "error": if message.is_empty() { "Internal error".to_string() } else { message }
                })
            }
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(status).json(body)
    }
}
