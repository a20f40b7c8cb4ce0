// handlers/protected/projects.rs - /api/projects CRUD handlers
//
// Handlers only unpack the request and shape the JSON body; ownership and
// identifier checks live in `ProjectService`.

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::{CreateProjectRequest, ProjectError, UpdateProjectRequest};
use crate::types::ProjectId;

/// GET /api/projects - all projects owned by the caller, newest update first
pub async fn project_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let projects = state.projects.list(&user.user_id).await?;
    Ok(Json(json!({ "projects": projects })))
}

/// GET /api/projects/:id
pub async fn project_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let project = state.projects.get(&user.user_id, &id).await?;
    Ok(Json(json!({ "project": project })))
}

/// POST /api/projects
pub async fn project_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(request) = payload?;
    let project = state.projects.create(&user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "project": project }))))
}

/// PUT /api/projects/:id - partial update, omitted keys keep their value
pub async fn project_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(_) if !ProjectId::is_valid(&id) => return Err(ProjectError::InvalidId.into()),
        Err(rejection) => return Err(rejection.into()),
    };

    let project = state.projects.update(&user.user_id, &id, request).await?;
    Ok(Json(json!({ "project": project })))
}

/// DELETE /api/projects/:id
pub async fn project_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.projects.delete(&user.user_id, &id).await?;
    Ok(Json(json!({ "message": "Project deleted successfully" })))
}
