//! Items of caller-defined entity namespaces. `entityName` is free-form; any
//! name addresses its own collection under the app.

use actix_web::{web, HttpRequest, HttpResponse};

use super::{document_response, limit_param, list_response, parse_attributes, parse_limit, resource};
use crate::error::ApiError;
use crate::middleware::require_auth;
use crate::models::{schema, Attributes, Document};
use crate::AppState;

const DEFAULT_ITEM_LIMIT: usize = 50;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        resource("/api/apps/{app_id}/entities/{entity_name}")
            .route(web::get().to(list_items))
            .route(web::post().to(create_item)),
    )
    .service(
        resource("/api/apps/{app_id}/entities/{entity_name}/{item_id}")
            .route(web::get().to(get_item))
            .route(web::put().to(update_item)),
    );
}

async fn list_items(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (app_id, entity_name) = path.into_inner();
    let limit = parse_limit(limit_param(&req).as_deref(), DEFAULT_ITEM_LIMIT);
    let docs = state
        .db
        .list_documents(&schema::entity_items(&app_id, &entity_name), Some(limit))?;
    Ok(list_response(docs))
}

async fn create_item(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    require_auth(&state, &req).await?;
    let (app_id, entity_name) = path.into_inner();
    let data = parse_attributes(&req, &body)?;

    let doc = state
        .db
        .add_document(&schema::entity_items(&app_id, &entity_name), &data)?;
    Ok(document_response(doc))
}

async fn get_item(
    state: web::Data<AppState>,
    path: web::Path<(String, String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (app_id, entity_name, item_id) = path.into_inner();
    let doc = state
        .db
        .get_document(&schema::entity_items(&app_id, &entity_name).doc(&item_id))?
        .ok_or_else(ApiError::not_found)?;
    Ok(document_response(doc))
}

async fn update_item(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String, String)>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    require_auth(&state, &req).await?;
    let (app_id, entity_name, item_id) = path.into_inner();
    let data = parse_attributes(&req, &body)?;

    let doc_path = schema::entity_items(&app_id, &entity_name).doc(&item_id);
    state.db.merge_document(&doc_path, &data)?;
    let doc = state.db.get_document(&doc_path)?.unwrap_or_else(|| Document {
        id: item_id,
        data: Attributes::new(),
    });
    Ok(document_response(doc))
}

#[cfg(test)]
mod tests {
    use crate::controllers;
    use crate::models::{schema, Attributes};
    use crate::test_support::{dev_state, AUTH};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_item_create_get_update() {
        let state = dev_state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(controllers::config)).await;

        let created: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/apps/app1/entities/Task")
                .insert_header(AUTH)
                .set_json(json!({"a": 1, "b": 2}))
                .to_request(),
        )
        .await;
        let item_id = created["id"].as_str().unwrap().to_string();

        let updated: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/apps/app1/entities/Task/{}", item_id))
                .insert_header(AUTH)
                .set_json(json!({"b": 3}))
                .to_request(),
        )
        .await;
        assert_eq!(updated, json!({"id": item_id, "a": 1, "b": 3}));

        let fetched: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/apps/app1/entities/Task/{}", item_id))
                .to_request(),
        )
        .await;
        assert_eq!(fetched, json!({"id": item_id, "a": 1, "b": 3}));
    }

    #[actix_web::test]
    async fn test_namespaces_are_isolated() {
        let state = dev_state();
        state
            .db
            .add_document(&schema::entity_items("app1", "Task"), &Attributes::new())
            .unwrap();
        let app = test::init_service(App::new().app_data(state).configure(controllers::config)).await;

        let tasks: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/apps/app1/entities/Task").to_request(),
        )
        .await;
        assert_eq!(tasks["items"].as_array().unwrap().len(), 1);

        let notes: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/apps/app1/entities/Note").to_request(),
        )
        .await;
        assert_eq!(notes, json!({"items": []}));
    }

    #[actix_web::test]
    async fn test_list_limit_default_and_override() {
        let state = dev_state();
        let collection = schema::entity_items("app1", "Log");
        for _ in 0..60 {
            state.db.add_document(&collection, &Attributes::new()).unwrap();
        }
        let app = test::init_service(App::new().app_data(state).configure(controllers::config)).await;

        let body: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/apps/app1/entities/Log").to_request(),
        )
        .await;
        assert_eq!(body["items"].as_array().unwrap().len(), 50);

        let body: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/apps/app1/entities/Log?limit=55")
                .to_request(),
        )
        .await;
        assert_eq!(body["items"].as_array().unwrap().len(), 55);
    }

    #[actix_web::test]
    async fn test_missing_item_is_404() {
        let state = dev_state();
        let app = test::init_service(App::new().app_data(state).configure(controllers::config)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/apps/app1/entities/Task/ghost")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"error": "Not found"}));
    }

    #[actix_web::test]
    async fn test_create_requires_auth() {
        let state = dev_state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(controllers::config)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/apps/app1/entities/Task")
                .set_json(json!({"a": 1}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            state
                .db
                .count_documents(&schema::entity_items("app1", "Task"))
                .unwrap(),
            0
        );
    }
}
