use axum::Json;
use serde_json::{Value, json};

/// GET /healthz
/// Liveness probe. Unversioned and outside the API prefix.
pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": 1 }))
}
