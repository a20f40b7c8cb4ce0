use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use crate::database::manager::DatabaseError;
use crate::database::models::project::{NewProject, Project, ProjectUpdate};
use crate::database::repository::ProjectRepository;
use crate::types::ProjectId;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Invalid project ID format")]
    InvalidId,

    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("Project not found")]
    NotFound,

    #[error("Storage failure during {operation}: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: DatabaseError,
    },
}

impl ProjectError {
    fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ProjectError::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Log at the operation boundary, then collapse into a storage failure
fn storage_failure(operation: &'static str) -> impl FnOnce(DatabaseError) -> ProjectError {
    move |source| {
        error!("{} project error: {}", operation, source);
        ProjectError::Storage { operation, source }
    }
}

/// Body of POST /api/projects. Unknown keys (including any owner field) are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub files: Option<Value>,
}

/// Body of PUT /api/projects/:id.
///
/// Outer `None` means the key was absent; `Some(None)` is an explicit `null`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub files: Option<Option<Value>>,
}

fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateProjectRequest {
    /// Validate the present keys once, before any storage access.
    /// `null` or `""` clears the description, `null` resets files to `{}`.
    fn into_changes(self) -> Result<ProjectChanges, ProjectError> {
        Ok(ProjectChanges {
            name: self.name.map(validate_name).transpose()?,
            description: self.description.map(Option::unwrap_or_default),
            files: self.files.map(validate_files).transpose()?,
        })
    }
}

/// Validated update; `None` keeps the stored value
#[derive(Debug)]
struct ProjectChanges {
    name: Option<String>,
    description: Option<String>,
    files: Option<Value>,
}

impl ProjectChanges {
    fn merge_onto(self, existing: &Project) -> ProjectUpdate {
        ProjectUpdate {
            name: self.name.unwrap_or_else(|| existing.name.clone()),
            description: self
                .description
                .unwrap_or_else(|| existing.description.clone()),
            files: self.files.unwrap_or_else(|| existing.files.clone()),
        }
    }
}

fn validate_name(name: Option<String>) -> Result<String, ProjectError> {
    match name {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(ProjectError::validation("name", "Project name is required")),
    }
}

fn validate_files(files: Option<Value>) -> Result<Value, ProjectError> {
    match files {
        None => Ok(json!({})),
        Some(files @ Value::Object(_)) => Ok(files),
        Some(_) => Err(ProjectError::validation("files", "Project files must be an object")),
    }
}

fn parse_id(candidate: &str) -> Result<ProjectId, ProjectError> {
    ProjectId::parse(candidate).ok_or(ProjectError::InvalidId)
}

/// Ownership-scoped operations on projects
#[derive(Clone)]
pub struct ProjectService {
    repo: Arc<dyn ProjectRepository>,
}

impl ProjectService {
    pub fn new(repo: Arc<dyn ProjectRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, owner: &str) -> Result<Vec<Project>, ProjectError> {
        self.repo
            .list_owned(owner)
            .await
            .map_err(storage_failure("Get"))
    }

    pub async fn get(&self, owner: &str, id: &str) -> Result<Project, ProjectError> {
        let id = parse_id(id)?;
        self.find_owned(&id, owner, "Get").await
    }

    pub async fn create(&self, owner: &str, request: CreateProjectRequest) -> Result<Project, ProjectError> {
        let name = validate_name(request.name)?;
        let files = validate_files(request.files)?;

        let project = self
            .repo
            .insert(NewProject {
                name,
                description: request.description.unwrap_or_default(),
                files,
                user_id: owner.to_string(),
            })
            .await
            .map_err(storage_failure("Create"))?;

        debug!("Created project {} for user {}", project.id, owner);
        Ok(project)
    }

    pub async fn update(
        &self,
        owner: &str,
        id: &str,
        request: UpdateProjectRequest,
    ) -> Result<Project, ProjectError> {
        let id = parse_id(id)?;
        let changes = request.into_changes()?;

        let existing = self.find_owned(&id, owner, "Update").await?;
        let update = changes.merge_onto(&existing);

        // The row may have been deleted between the check and the write
        self.repo
            .update_owned(&id, owner, update)
            .await
            .map_err(storage_failure("Update"))?
            .ok_or(ProjectError::NotFound)
    }

    pub async fn delete(&self, owner: &str, id: &str) -> Result<(), ProjectError> {
        let id = parse_id(id)?;
        self.find_owned(&id, owner, "Delete").await?;

        let removed = self
            .repo
            .delete_owned(&id, owner)
            .await
            .map_err(storage_failure("Delete"))?;

        if !removed {
            return Err(ProjectError::NotFound);
        }

        debug!("Deleted project {} for user {}", id, owner);
        Ok(())
    }

    /// Single query filtered by id AND owner; foreign and missing rows are both NotFound
    async fn find_owned(
        &self,
        id: &ProjectId,
        owner: &str,
        operation: &'static str,
    ) -> Result<Project, ProjectError> {
        self.repo
            .find_owned(id, owner)
            .await
            .map_err(storage_failure(operation))?
            .ok_or(ProjectError::NotFound)
    }
}
