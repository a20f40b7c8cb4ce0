// handlers/protected/auth/whoami.rs - GET /api/auth/whoami handler

use axum::{extract::Extension, response::Json};
use serde_json::{json, Value};

use crate::middleware::AuthUser;

/// GET /api/auth/whoami - identity resolved from the bearer token.
///
/// Reads only the token claims; no storage access.
pub async fn whoami(Extension(user): Extension<AuthUser>) -> Json<Value> {
    Json(json!({
        "user": {
            "id": user.user_id
        }
    }))
}
