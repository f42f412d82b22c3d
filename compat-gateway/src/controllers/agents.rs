use actix_web::{web, HttpRequest, HttpResponse};

use super::{document_response, list_response, parse_attributes, resource};
use crate::db::server_timestamp;
use crate::error::ApiError;
use crate::middleware::require_auth;
use crate::models::{schema, Attributes, Document};
use crate::AppState;

/// Conversations are listed without a caller-supplied limit
const CONVERSATION_LIST_CAP: usize = 50;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        resource("/api/apps/{app_id}/agents")
            .route(web::get().to(list_agents))
            .route(web::post().to(create_agent)),
    )
    .service(
        resource("/api/apps/{app_id}/agents/{agent_id}")
            .route(web::get().to(get_agent))
            .route(web::put().to(update_agent)),
    )
    .service(
        resource("/api/apps/{app_id}/agents/{agent_id}/conversations")
            .route(web::get().to(list_conversations))
            .route(web::post().to(create_conversation)),
    )
    .service(
        resource("/api/apps/{app_id}/agents/{agent_id}/conversations/{conv_id}/messages")
            .route(web::post().to(create_message)),
    );
}

async fn list_agents(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let app_id = path.into_inner();
    let docs = state.db.list_documents(&schema::agents(&app_id), None)?;
    Ok(list_response(docs))
}

async fn create_agent(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    require_auth(&state, &req).await?;
    let app_id = path.into_inner();
    let data = parse_attributes(&req, &body)?;

    let doc = state.db.add_document(&schema::agents(&app_id), &data)?;
    Ok(document_response(doc))
}

async fn get_agent(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (app_id, agent_id) = path.into_inner();
    let doc = state
        .db
        .get_document(&schema::agents(&app_id).doc(&agent_id))?
        .ok_or(ApiError::NotFound("Agent not found"))?;
    Ok(document_response(doc))
}

/// Merge-set then re-read. The two steps are not atomic, so a concurrent
/// writer's value may be returned instead of ours.
async fn update_agent(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    require_auth(&state, &req).await?;
    let (app_id, agent_id) = path.into_inner();
    let data = parse_attributes(&req, &body)?;

    let doc_path = schema::agents(&app_id).doc(&agent_id);
    state.db.merge_document(&doc_path, &data)?;
    let doc = state.db.get_document(&doc_path)?.unwrap_or_else(|| Document {
        id: agent_id,
        data: Attributes::new(),
    });
    Ok(document_response(doc))
}

async fn list_conversations(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (app_id, agent_id) = path.into_inner();
    let docs = state
        .db
        .list_documents(&schema::conversations(&app_id, &agent_id), Some(CONVERSATION_LIST_CAP))?;
    Ok(list_response(docs))
}

async fn create_conversation(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    require_auth(&state, &req).await?;
    let (app_id, agent_id) = path.into_inner();
    let data = parse_attributes(&req, &body)?;

    let doc = state
        .db
        .add_document(&schema::conversations(&app_id, &agent_id), &data)?;
    Ok(document_response(doc))
}

async fn create_message(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String, String)>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    require_auth(&state, &req).await?;
    let (app_id, agent_id, conv_id) = path.into_inner();

    // Body attributes are applied over the stamp
    let mut data = Attributes::new();
    data.insert("createdAt".to_string(), server_timestamp());
    data.extend(parse_attributes(&req, &body)?);

    let doc = state
        .db
        .add_document(&schema::messages(&app_id, &agent_id, &conv_id), &data)?;
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
    async fn test_agent_lifecycle_merges_on_put() {
        let state = dev_state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(controllers::config)).await;

        let created: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/apps/app1/agents")
                .insert_header(AUTH)
                .set_json(json!({"a": 1, "b": 2}))
                .to_request(),
        )
        .await;
        let agent_id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["a"], 1);

        let updated: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/apps/app1/agents/{}", agent_id))
                .insert_header(AUTH)
                .set_json(json!({"b": 3}))
                .to_request(),
        )
        .await;
        assert_eq!(updated, json!({"id": agent_id, "a": 1, "b": 3}));

        let fetched: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/apps/app1/agents/{}", agent_id))
                .to_request(),
        )
        .await;
        assert_eq!(fetched, json!({"id": agent_id, "a": 1, "b": 3}));

        let listed: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/apps/app1/agents").to_request(),
        )
        .await;
        assert_eq!(listed["items"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_missing_agent_message() {
        let state = dev_state();
        let app = test::init_service(App::new().app_data(state).configure(controllers::config)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/apps/app1/agents/ghost").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"error": "Agent not found"}));
    }

    #[actix_web::test]
    async fn test_put_requires_auth() {
        let state = dev_state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(controllers::config)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/apps/app1/agents/g1")
                .set_json(json!({"b": 3}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(state
            .db
            .get_document(&schema::agents("app1").doc("g1"))
            .unwrap()
            .is_none());
    }

    #[actix_web::test]
    async fn test_conversations_are_capped() {
        let state = dev_state();
        let collection = schema::conversations("app1", "g1");
        for _ in 0..55 {
            state.db.add_document(&collection, &Attributes::new()).unwrap();
        }
        let app = test::init_service(App::new().app_data(state).configure(controllers::config)).await;

        let body: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/apps/app1/agents/g1/conversations?limit=100")
                .to_request(),
        )
        .await;
        assert_eq!(body["items"].as_array().unwrap().len(), 50);
    }

    #[actix_web::test]
    async fn test_message_is_stamped() {
        let state = dev_state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(controllers::config)).await;

        let conversation: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/apps/app1/agents/g1/conversations")
                .insert_header(AUTH)
                .set_json(json!({"title": "hello"}))
                .to_request(),
        )
        .await;
        let conv_id = conversation["id"].as_str().unwrap();

        let message: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/apps/app1/agents/g1/conversations/{}/messages", conv_id))
                .insert_header(AUTH)
                .set_json(json!({"role": "user", "content": "hi"}))
                .to_request(),
        )
        .await;
        assert_eq!(message["content"], "hi");
        let stamp = message["createdAt"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());

        assert_eq!(
            state
                .db
                .count_documents(&schema::messages("app1", "g1", conv_id))
                .unwrap(),
            1
        );
    }

    #[actix_web::test]
    async fn test_message_requires_auth() {
        let state = dev_state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(controllers::config)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/apps/app1/agents/g1/conversations/c1/messages")
                .set_json(json!({"content": "hi"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            state
                .db
                .count_documents(&schema::messages("app1", "g1", "c1"))
                .unwrap(),
            0
        );
    }
}
