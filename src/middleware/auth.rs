use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::Claims;
use crate::error::ApiError;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context.
///
/// Rejects with 401 before any handler runs; on success injects [`AuthUser`]
/// into the request extensions.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(|msg| {
        tracing::debug!("Rejected request without usable bearer token: {}", msg);
        ApiError::unauthorized(msg)
    })?;

    let claims = state.keys.decode_jwt(token).map_err(|e| {
        tracing::warn!("Rejected bearer token: {}", e);
        ApiError::unauthorized("Invalid or expired token")
    })?;

    let auth_user = AuthUser::from(claims);
    tracing::debug!("Authenticated user {}", auth_user.user_id);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("Access token required")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must use Bearer token format")?
        .trim();

    if token.is_empty() {
        return Err("Empty JWT token");
    }
    Ok(token)
}
