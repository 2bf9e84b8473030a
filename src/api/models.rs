use serde::{Deserialize, Serialize};

use crate::recipe::RenderedRecipe;

/// POST /chat request
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// POST /chat response; `reply` is an HTML fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// POST /api/match request
#[derive(Debug, Clone, Deserialize)]
pub struct MatchRequest {
    #[serde(default)]
    pub query: String,
}

/// POST /api/match response.
///
/// A miss serializes to `{"found": false}` only, never to an empty recipe.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<RenderedRecipe>,
}

impl MatchResponse {
    pub fn not_found() -> Self {
        Self {
            found: false,
            title: None,
            score: None,
            recipe: None,
        }
    }
}

/// Status response for / and /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub recipes: usize,
    pub loaded_at: Option<String>,
}
