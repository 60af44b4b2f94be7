use actix_web::{get, web, HttpResponse};
use std::sync::Arc;

use crate::state::AppState;
use crate::types::{HealthResponse, RootResponse};

#[get("/")]
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(RootResponse {
        status: "ok".to_string(),
        message: "VoiceBrief API is running".to_string(),
    })
}

/// GET /health - configuration and transcriber readiness
#[get("/health")]
pub async fn health(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let availability = state.transcriber.availability().await;

    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        gemini_api_key_set: state.config.has_api_key(),
        gemini_model: state.config.gemini_model.clone(),
        transcriber: state.transcriber.kind().to_string(),
        whisper_model: state.pipeline.default_model().to_string(),
        transcriber_available: availability.available,
        transcriber_detail: availability.detail,
    })
}
