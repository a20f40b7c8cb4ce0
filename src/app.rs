use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::JwtKeys;
use crate::config::AppConfig;
use crate::database::repository::ProjectRepository;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::ProjectService;

/// Shared handles passed to every request; built once at startup
#[derive(Clone)]
pub struct AppState {
    pub projects: ProjectService,
    pub repo: Arc<dyn ProjectRepository>,
    pub keys: JwtKeys,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(repo: Arc<dyn ProjectRepository>, keys: JwtKeys, config: Arc<AppConfig>) -> Self {
        Self {
            projects: ProjectService::new(repo.clone()),
            repo,
            keys,
            config,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/api/health", get(public::health))
        // Protected API
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, projects};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route(
            "/api/projects",
            get(projects::project_list).post(projects::project_create),
        )
        .route(
            "/api/projects/:id",
            get(projects::project_get)
                .put(projects::project_update)
                .delete(projects::project_delete),
        )
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

/// Exact-match origin allow list with credentials
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
