// HTTP API Error Types
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::services::project_service::ProjectError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body; `error` carries the client-facing message
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "error": self.message(),
            "message": self.message(),
            "code": self.error_code()
        });

        if let ApiError::ValidationError {
            field_errors: Some(field_errors),
            ..
        } = self
        {
            response["field_errors"] = json!(field_errors);
        }

        response
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<ProjectError> for ApiError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::InvalidId => ApiError::bad_request("Invalid project ID format"),
            ProjectError::Validation { field, message } => {
                let mut field_errors = HashMap::new();
                field_errors.insert(field.to_string(), message.clone());
                ApiError::validation_error(message, Some(field_errors))
            }
            ProjectError::NotFound => ApiError::not_found("Project not found"),
            // Already logged at the operation boundary; never expose storage details
            ProjectError::Storage { .. } => ApiError::internal_server_error("Internal server error"),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::manager::DatabaseError;

    #[test]
    fn maps_project_errors_to_status_codes() {
        let cases = [
            (ProjectError::InvalidId, StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (
                ProjectError::Validation {
                    field: "name",
                    message: "Project name is required".to_string(),
                },
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (ProjectError::NotFound, StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                ProjectError::Storage {
                    operation: "Get",
                    source: DatabaseError::Sqlx(sqlx::Error::PoolTimedOut),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status_code(), status);
            assert_eq!(api.error_code(), code);
        }
    }

    #[test]
    fn storage_details_are_not_exposed() {
        let api: ApiError = ProjectError::Storage {
            operation: "Get",
            source: DatabaseError::ConfigMissing("DATABASE_URL"),
        }
        .into();
        assert!(!api.to_json().to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn error_key_holds_the_message() {
        let body = ApiError::from(ProjectError::NotFound).to_json();
        assert_eq!(body["error"], "Project not found");
        assert_eq!(body["code"], "NOT_FOUND");

        let body = ApiError::from(ProjectError::InvalidId).to_json();
        assert_eq!(body["error"], "Invalid project ID format");
    }

    #[test]
    fn validation_errors_carry_field_errors() {
        let api: ApiError = ProjectError::Validation {
            field: "name",
            message: "Project name is required".to_string(),
        }
        .into();
        let body = api.to_json();
        assert_eq!(body["error"], "Project name is required");
        assert_eq!(body["field_errors"]["name"], "Project name is required");
    }
}
