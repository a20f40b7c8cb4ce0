use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;

/// GET / - service banner
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "message": "CipherStudio Backend API",
        "version": version,
        "endpoints": {
            "health": "/api/health",
            "auth": "/api/auth/*",
            "projects": "/api/projects"
        }
    }))
}

/// GET /api/health - liveness plus a storage ping
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.repo.ping().await.map_err(|e| {
        tracing::error!("Health check failed: {}", e);
        ApiError::service_unavailable("Database unavailable")
    })?;

    Ok(Json(json!({
        "status": "ok",
        "message": "CipherStudio API is running",
        "environment": state.config.environment.as_str(),
        "database": "ok"
    })))
}
