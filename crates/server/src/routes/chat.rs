use actix_web::{post, web, HttpResponse};
use std::sync::Arc;
use voicebrief_llm::ChatRequest;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /chat - relay a conversation to Gemini
#[post("/chat")]
pub async fn chat(
    req: web::Json<ChatRequest>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let response = state.relay.reply(&req).await?;
    Ok(HttpResponse::Ok().json(response))
}
