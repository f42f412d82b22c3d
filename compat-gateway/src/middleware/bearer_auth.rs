// Bearer token authentication for gateway routes.
// Read routes call `authenticate` (identity optional); write routes call
// `require_auth`, which fails with 401 before any store access.

use actix_web::HttpRequest;

use crate::error::ApiError;
use crate::models::{Identity, EMULATOR_TOKEN};
use crate::AppState;

/// Token from `Authorization: <token>` or `Authorization: Bearer <token>`.
/// Any other header shape yields `None`.
pub fn extract_token(req: &HttpRequest) -> Option<String> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())?;

    let parts: Vec<&str> = header.split(' ').collect();
    match parts.as_slice() {
        [token] => Some(token.to_string()),
        [scheme, token] if scheme.eq_ignore_ascii_case("Bearer") => Some(token.to_string()),
        _ => None,
    }
}

/// Resolve the caller's identity, or `None` when unauthenticated
pub async fn authenticate(state: &AppState, req: &HttpRequest) -> Option<Identity> {
    let token = extract_token(req)?;

    if state.config.dev_mode && token == EMULATOR_TOKEN {
        return Some(Identity::emulator());
    }

    match state.verifier.verify(&token).await {
        Ok(identity) => Some(identity),
        Err(e) => {
            log::debug!("Token verification failed: {}", e);
            None
        }
    }
}

pub async fn require_auth(state: &AppState, req: &HttpRequest) -> Result<Identity, ApiError> {
    authenticate(state, req).await.ok_or(ApiError::Unauthenticated)
}
