use actix_web::http::Uri;
use actix_web::{HttpMessage, HttpRequest};

/// Request URI as received, stored in request extensions ahead of path
/// normalization.
#[derive(Debug, Clone)]
pub struct OriginalUri(pub Uri);

/// Path and query the client actually sent
pub fn original_path_and_query(req: &HttpRequest) -> String {
    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map(|original| original.0.clone())
        .unwrap_or_else(|| req.uri().clone());

    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}
