use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::{json, Value};

use super::{document_response, is_truthy, limit_param, list_response, parse_attributes, parse_limit, resource};
use crate::db::server_timestamp;
use crate::error::ApiError;
use crate::middleware::require_auth;
use crate::models::{schema, Attributes, Document};
use crate::AppState;

const DEFAULT_APP_LIMIT: usize = 10;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(resource("/api/apps/public/prod/by-slug/{slug}").route(web::get().to(get_app_by_slug)))
        .service(resource("/api/apps/public/prod/by-id/{id}").route(web::get().to(get_app)))
        .service(
            resource("/api/apps")
                .route(web::get().to(list_apps))
                .route(web::post().to(create_app)),
        )
        .service(
            resource("/api/apps/{id}")
                .route(web::get().to(get_app))
                .route(web::put().to(update_app)),
        )
        .service(
            resource("/api/apps/{app_id}/integration-endpoints/schema")
                .route(web::get().to(get_integration_schema)),
        )
        .service(resource("/api/apps/{app_id}/users/invite-user").route(web::post().to(invite_user)));
}

async fn list_apps(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let limit = parse_limit(limit_param(&req).as_deref(), DEFAULT_APP_LIMIT);
    let docs = state.db.list_documents(&schema::apps(), Some(limit))?;
    Ok(list_response(docs))
}

async fn get_app(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let doc = state
        .db
        .get_document(&schema::app(&id))?
        .ok_or_else(ApiError::not_found)?;
    Ok(document_response(doc))
}

async fn create_app(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let identity = require_auth(&state, &req).await?;
    let data = parse_attributes(&req, &body)?;

    let doc = state.db.add_document(&schema::apps(), &data)?;
    log::info!("App {} created by {}", doc.id, identity.uid);
    Ok(document_response(doc))
}

async fn update_app(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    require_auth(&state, &req).await?;
    let id = path.into_inner();
    let data = parse_attributes(&req, &body)?;

    let doc_path = schema::app(&id);
    state.db.merge_document(&doc_path, &data)?;
    let doc = state.db.get_document(&doc_path)?.unwrap_or_else(|| Document {
        id,
        data: Attributes::new(),
    });
    Ok(document_response(doc))
}

async fn get_app_by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let slug = path.into_inner();
    let doc = state
        .db
        .find_documents(&schema::apps(), "slug", &Value::String(slug), 1)?
        .into_iter()
        .next()
        .ok_or_else(ApiError::not_found)?;
    Ok(document_response(doc))
}

async fn get_integration_schema() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "installed_packages": [],
        "missing_packages": [],
        "endpoints": [],
    }))
}

async fn invite_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    require_auth(&state, &req).await?;
    let app_id = path.into_inner();
    let body = parse_attributes(&req, &body)?;

    let email = body.get("user_email");
    if !is_truthy(email) {
        return Err(ApiError::required("user_email"));
    }
    let role = body
        .get("role")
        .filter(|role| is_truthy(Some(*role)))
        .cloned()
        .unwrap_or_else(|| Value::String("member".to_string()));

    let mut invite = Attributes::new();
    invite.insert("email".to_string(), email.cloned().unwrap_or(Value::Null));
    invite.insert("role".to_string(), role);
    invite.insert("createdAt".to_string(), server_timestamp());

    let doc = state.db.add_document(&schema::invites(&app_id), &invite)?;
    Ok(document_response(doc))
}
