pub mod client;
pub mod config;
pub mod controllers;
pub mod db;
pub mod error;
pub mod identity;
pub mod interceptor;
pub mod middleware;
pub mod models;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpMessage};
use std::sync::Arc;

use config::Config;
use db::Database;
use identity::IdentityVerifier;
use middleware::OriginalUri;

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    pub verifier: Arc<dyn IdentityVerifier>,
}

/// The gateway application with its full middleware stack. The URI is
/// recorded before trailing slashes are trimmed so 501 bodies can echo what
/// the client sent.
pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let cors = Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

    App::new()
        .app_data(state)
        .wrap(NormalizePath::trim())
        .wrap_fn(|req, srv| {
            let uri = req.uri().clone();
            req.extensions_mut().insert(OriginalUri(uri));
            srv.call(req)
        })
        .wrap(Logger::default())
        .wrap(cors)
        .configure(controllers::config)
}
