use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::debug;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::project::{NewProject, Project, ProjectUpdate};
use crate::types::ProjectId;

/// Storage collaborator for projects.
///
/// Every read and write except `insert` is scoped by owner: a row that exists but
/// belongs to someone else is reported exactly like a missing row.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// All projects owned by `owner`, most recently updated first
    async fn list_owned(&self, owner: &str) -> Result<Vec<Project>, DatabaseError>;

    async fn find_owned(&self, id: &ProjectId, owner: &str) -> Result<Option<Project>, DatabaseError>;

    async fn insert(&self, project: NewProject) -> Result<Project, DatabaseError>;

    /// Replace the mutable columns and bump `updated_at`; `None` when no owned row matched
    async fn update_owned(
        &self,
        id: &ProjectId,
        owner: &str,
        update: ProjectUpdate,
    ) -> Result<Option<Project>, DatabaseError>;

    /// `false` when no owned row matched
    async fn delete_owned(&self, id: &ProjectId, owner: &str) -> Result<bool, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

const PROJECT_COLUMNS: &str = "id, name, description, files, user_id, created_at, updated_at";

pub struct PgProjectRepository {
    pool: PgPool,
}

impl PgProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn list_owned(&self, owner: &str) -> Result<Vec<Project>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM projects WHERE user_id = $1 ORDER BY updated_at DESC, id DESC",
            PROJECT_COLUMNS
        );

        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

        debug!("Listed {} projects for user {}", projects.len(), owner);
        Ok(projects)
    }

    async fn find_owned(&self, id: &ProjectId, owner: &str) -> Result<Option<Project>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM projects WHERE id = $1 AND user_id = $2",
            PROJECT_COLUMNS
        );

        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id.as_str())
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        Ok(project)
    }

    async fn insert(&self, project: NewProject) -> Result<Project, DatabaseError> {
        let id = ProjectId::generate();
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO projects (id, name, description, files, user_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {}",
            PROJECT_COLUMNS
        );

        let created = sqlx::query_as::<_, Project>(&sql)
            .bind(id.as_str())
            .bind(&project.name)
            .bind(&project.description)
            .bind(&project.files)
            .bind(&project.user_id)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        debug!("Inserted project {} for user {}", created.id, created.user_id);
        Ok(created)
    }

    async fn update_owned(
        &self,
        id: &ProjectId,
        owner: &str,
        update: ProjectUpdate,
    ) -> Result<Option<Project>, DatabaseError> {
        let sql = format!(
            "UPDATE projects SET name = $3, description = $4, files = $5, updated_at = $6 \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            PROJECT_COLUMNS
        );

        let updated = sqlx::query_as::<_, Project>(&sql)
            .bind(id.as_str())
            .bind(owner)
            .bind(&update.name)
            .bind(&update.description)
            .bind(&update.files)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    async fn delete_owned(&self, id: &ProjectId, owner: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id.as_str())
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
