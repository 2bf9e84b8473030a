use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{debug, error};

use crate::{
    api::models::*, cache::RecipeCache, chat::ChatService, web::render_reply, Error, Result,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub cache: Arc<RecipeCache>,
}

/// POST /chat - Answer a chat message with an HTML reply
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(Error::Validation("message must not be empty".to_string()));
    }

    let reply = state.chat.reply(message).await.inspect_err(|e| {
        error!("Chat reply failed: {}", e.log_safe());
    })?;

    Ok(Json(ChatResponse {
        reply: render_reply(&reply)?,
    }))
}

/// POST /api/match - Structured recipe lookup
pub async fn match_recipe(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResponse>> {
    debug!("Match request: {:?}", request.query);

    Ok(Json(match state.chat.lookup(&request.query) {
        Some(found) => MatchResponse {
            found: true,
            title: Some(found.title),
            score: Some(found.score),
            recipe: Some(found.recipe),
        },
        None => MatchResponse::not_found(),
    }))
}

/// GET / and GET /health - Liveness
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

/// GET /ready - Ready once a recipe snapshot has been loaded
pub async fn readiness_check(State(state): State<AppState>) -> Result<Json<ReadinessResponse>> {
    let snapshot = state.cache.snapshot();

    Ok(Json(ReadinessResponse {
        ready: snapshot.is_loaded(),
        recipes: snapshot.len(),
        loaded_at: snapshot.loaded_at.map(|dt| dt.to_rfc3339()),
    }))
}
