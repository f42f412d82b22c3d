use actix_web::{web, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

use compat_gateway::config::Config;
use compat_gateway::db::Database;
use compat_gateway::identity::{DisabledVerifier, IdentityVerifier, RemoteVerifier};
use compat_gateway::{build_app, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    log::info!("Initializing database at {}", config.database_url);
    let db = Database::new(&config.database_url).map_err(|e| {
        log::error!("Failed to initialize database: {}", e);
        std::io::Error::other(e)
    })?;

    let verifier: Arc<dyn IdentityVerifier> = match &config.identity_api_key {
        Some(key) => {
            log::info!("Verifying bearer tokens against {}", config.identity_base_url);
            Arc::new(RemoteVerifier::new(&config.identity_base_url, key))
        }
        None => {
            log::warn!("IDENTITY_API_KEY not set - only the emulator token can authenticate");
            Arc::new(DisabledVerifier)
        }
    };

    if config.dev_mode {
        log::warn!("Emulator mode enabled: the shared emulator token is accepted");
    }

    let bind = (config.bind_address.clone(), config.port);
    log::info!("Starting compat gateway on {}:{}", bind.0, bind.1);

    let state = web::Data::new(AppState {
        db: Arc::new(db),
        config,
        verifier,
    });

    HttpServer::new(move || build_app(state.clone()))
        .bind(bind)?
        .run()
        .await
}
