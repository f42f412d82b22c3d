pub mod agents;
pub mod apps;
pub mod auth;
pub mod entities;
pub mod fallback;
pub mod health;

use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, Resource};
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{list_envelope, Attributes, Document};

/// Register every gateway route. Public lookups go first so they are never
/// shadowed by the `{id}` routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    health::config(cfg);
    apps::config(cfg);
    agents::config(cfg);
    entities::config(cfg);
    auth::config(cfg);
    cfg.default_service(web::to(fallback::unmatched));
}

/// Resource whose unmatched methods fall through to the 501/404 handler
/// instead of actix's 405.
pub(crate) fn resource(path: &str) -> Resource {
    web::resource(path).default_service(web::to(fallback::unmatched))
}

/// First `limit` value in the query string. Repeated keys are tolerated.
pub(crate) fn limit_param(req: &HttpRequest) -> Option<String> {
    url::form_urlencoded::parse(req.query_string().as_bytes())
        .find(|(key, _)| key == "limit")
        .map(|(_, value)| value.into_owned())
}

/// Leading-digit integer parse; anything missing, unparsable or non-positive
/// falls back to `default`.
pub(crate) fn parse_limit(raw: Option<&str>, default: usize) -> usize {
    let digits: String = raw
        .unwrap_or("")
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    match digits.parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => default,
    }
}

/// Request body as document attributes. Bodies that are empty or not sent as
/// `application/json` are treated as `{}`.
pub(crate) fn parse_attributes(req: &HttpRequest, body: &web::Bytes) -> Result<Attributes, ApiError> {
    if !req.content_type().eq_ignore_ascii_case("application/json") {
        return Ok(Attributes::new());
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Attributes::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::Validation("Request body must be a JSON object".to_string())),
        Err(e) => Err(ApiError::Validation(format!("Invalid JSON body: {}", e))),
    }
}

/// JavaScript-style truthiness, used for "field required" checks
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

pub(crate) fn document_response(doc: Document) -> HttpResponse {
    HttpResponse::Ok().json(doc.into_envelope())
}

pub(crate) fn list_response(docs: Vec<Document>) -> HttpResponse {
    HttpResponse::Ok().json(list_envelope(docs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use serde_json::json;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None, 10), 10);
        assert_eq!(parse_limit(Some("5"), 10), 5);
        assert_eq!(parse_limit(Some("25abc"), 10), 25);
        assert_eq!(parse_limit(Some("abc"), 50), 50);
        assert_eq!(parse_limit(Some("0"), 10), 10);
        assert_eq!(parse_limit(Some("-3"), 10), 10);
        assert_eq!(parse_limit(Some(""), 50), 50);
    }

    fn json_request() -> HttpRequest {
        TestRequest::default()
            .insert_header(("Content-Type", "application/json; charset=utf-8"))
            .to_http_request()
    }

    #[test]
    fn test_parse_attributes() {
        let req = json_request();
        assert!(parse_attributes(&req, &web::Bytes::new()).unwrap().is_empty());
        assert!(parse_attributes(&req, &web::Bytes::from_static(b"  \n")).unwrap().is_empty());

        let attrs = parse_attributes(&req, &web::Bytes::from_static(br#"{"a":1}"#)).unwrap();
        assert_eq!(attrs.get("a"), Some(&json!(1)));

        assert!(matches!(
            parse_attributes(&req, &web::Bytes::from_static(b"[1,2]")),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            parse_attributes(&req, &web::Bytes::from_static(b"{nope")),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_non_json_content_type_is_empty_body() {
        let body = web::Bytes::from_static(b"{nope");

        let text = TestRequest::default()
            .insert_header(("Content-Type", "text/plain"))
            .to_http_request();
        assert!(parse_attributes(&text, &body).unwrap().is_empty());

        let missing = TestRequest::default().to_http_request();
        assert!(parse_attributes(&missing, &web::Bytes::from_static(br#"{"a":1}"#))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_limit_param_takes_first_value() {
        let req = TestRequest::with_uri("/api/apps?limit=1&limit=2").to_http_request();
        assert_eq!(limit_param(&req).as_deref(), Some("1"));

        let req = TestRequest::with_uri("/api/apps?x=1&limit=%207").to_http_request();
        assert_eq!(limit_param(&req).as_deref(), Some(" 7"));

        let req = TestRequest::with_uri("/api/apps").to_http_request();
        assert_eq!(limit_param(&req), None);
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(null))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(is_truthy(Some(&json!("a@b.c"))));
        assert!(is_truthy(Some(&json!(1))));
        assert!(is_truthy(Some(&json!([]))));
    }
}
