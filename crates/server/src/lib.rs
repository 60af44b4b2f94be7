//! VoiceBrief HTTP Server
//!
//! Actix-web REST API: chat relay and transcribe-summarize pipeline

pub mod artifact;
pub mod error;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod types;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;
use voicebrief_common::{AppConfig, Result, VoiceBriefError};

pub use error::ApiError;
pub use pipeline::Pipeline;
pub use state::AppState;

/// Register routes and extractor settings
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::from(VoiceBriefError::invalid_input(format!("Invalid request body: {}", err))).into()
    });

    cfg.app_data(json_config)
        .service(routes::system::root)
        .service(routes::system::health)
        .service(routes::chat::chat)
        .service(routes::transcribe::transcribe_summarize);
}

/// Build application state from `config` and serve until shutdown
pub async fn start_server(config: AppConfig) -> Result<()> {
    let bind_addr = config.server_bind_address();
    let state = web::Data::new(Arc::new(AppState::new(config)?));

    info!("Starting HTTP server on http://{}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
