pub mod project_service;

pub use project_service::{CreateProjectRequest, ProjectError, ProjectService, UpdateProjectRequest};
