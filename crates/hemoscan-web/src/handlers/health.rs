use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::SharedState;

/// GET /health: liveness probe.
pub async fn health(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "model_features": state.classifier.feature_count(),
    }))
}
