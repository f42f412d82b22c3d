use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Serialize;
use serde_json::{json, Value};

use super::{is_truthy, parse_attributes, resource};
use crate::db::server_timestamp;
use crate::error::ApiError;
use crate::models::{schema, Attributes, EMULATOR_TOKEN};
use crate::AppState;

#[derive(Serialize)]
pub struct LoginUser {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<Value>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    token: &'static str,
    user: LoginUser,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(resource("/api/auth/login").route(web::post().to(login)))
        .service(resource("/api/auth/signup").route(web::post().to(signup)))
        .service(resource("/api/auth/reset-password-request").route(web::post().to(reset_password)))
        .service(resource("/api/auth/reset-password").route(web::post().to(reset_password)));
}

/// Synthesized user id: every non-alphanumeric UTF-16 code unit becomes `_`,
/// so characters outside the BMP turn into two underscores.
fn user_id_from_email(email: &str) -> String {
    let mut id = String::with_capacity(email.len());
    for c in email.chars() {
        if c.is_ascii_alphanumeric() {
            id.push(c);
        } else {
            id.extend(std::iter::repeat('_').take(c.len_utf16()));
        }
    }
    id
}

/// Stub login: no password check, always hands out the emulator token
async fn login(req: HttpRequest, body: web::Bytes) -> Result<HttpResponse, ApiError> {
    let body = parse_attributes(&req, &body)?;
    let email = body.get("email").cloned();

    let id = match &email {
        Some(Value::String(s)) if !s.is_empty() => user_id_from_email(s),
        _ => "anon".to_string(),
    };

    Ok(HttpResponse::Ok().json(LoginResponse {
        token: EMULATOR_TOKEN,
        user: LoginUser { id, email },
    }))
}

async fn signup(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let body = parse_attributes(&req, &body)?;
    let email = body.get("email");
    if !is_truthy(email) {
        return Err(ApiError::required("email"));
    }

    let mut user = Attributes::new();
    user.insert("email".to_string(), email.cloned().unwrap_or(Value::Null));
    user.insert("createdAt".to_string(), server_timestamp());

    let doc = state.db.add_document(&schema::users(), &user)?;
    log::info!("Signed up user {}", doc.id);

    Ok(HttpResponse::Ok().json(json!({
        "id": doc.id,
        "email": doc.data.get("email"),
    })))
}

async fn reset_password() -> impl Responder {
    HttpResponse::Ok().json(json!({ "ok": true }))
}
