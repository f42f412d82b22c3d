use actix_web::{web, HttpResponse, Responder};

use super::resource;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(resource("/health").route(web::get().to(health_check)));
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
}
