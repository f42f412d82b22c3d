use actix_web::{HttpRequest, HttpResponse};

use crate::error::ApiError;
use crate::middleware::original_path_and_query;

/// Anything no route claimed: 501 under `/api/`, 404 elsewhere
pub async fn unmatched(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let path = original_path_and_query(&req);
    if path.starts_with("/api/") {
        log::debug!("Unimplemented route {} {}", req.method(), path);
        return Err(ApiError::Unimplemented { path });
    }
    Err(ApiError::not_found())
}
