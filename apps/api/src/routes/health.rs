use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/health
pub async fn handle_health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "specialists_loaded": state.registry.len(),
        "model_backend_configured": !state.config.anthropic_api_key.is_empty(),
    }))
}
