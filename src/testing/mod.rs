use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::app::AppState;
use crate::auth::JwtKeys;
use crate::config::AppConfig;
use crate::database::manager::DatabaseError;
use crate::database::memory::MemoryProjectRepository;
use crate::database::models::project::{NewProject, Project, ProjectUpdate};
use crate::database::repository::ProjectRepository;
use crate::types::ProjectId;

pub const TEST_SECRET: &str = "cipherstudio-test-secret";

/// Memory repository that records how many storage calls were made
#[derive(Default)]
pub struct CountingRepository {
    inner: MemoryProjectRepository,
    calls: AtomicUsize,
}

impl CountingRepository {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProjectRepository for CountingRepository {
    async fn list_owned(&self, owner: &str) -> Result<Vec<Project>, DatabaseError> {
        self.record();
        self.inner.list_owned(owner).await
    }

    async fn find_owned(&self, id: &ProjectId, owner: &str) -> Result<Option<Project>, DatabaseError> {
        self.record();
        self.inner.find_owned(id, owner).await
    }

    async fn insert(&self, project: NewProject) -> Result<Project, DatabaseError> {
        self.record();
        self.inner.insert(project).await
    }

    async fn update_owned(
        &self,
        id: &ProjectId,
        owner: &str,
        update: ProjectUpdate,
    ) -> Result<Option<Project>, DatabaseError> {
        self.record();
        self.inner.update_owned(id, owner, update).await
    }

    async fn delete_owned(&self, id: &ProjectId, owner: &str) -> Result<bool, DatabaseError> {
        self.record();
        self.inner.delete_owned(id, owner).await
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.inner.ping().await
    }
}

/// Repository whose every call fails as if the database were unreachable
pub struct FailingRepository;

fn unavailable() -> DatabaseError {
    DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl ProjectRepository for FailingRepository {
    async fn list_owned(&self, _owner: &str) -> Result<Vec<Project>, DatabaseError> {
        Err(unavailable())
    }

    async fn find_owned(&self, _id: &ProjectId, _owner: &str) -> Result<Option<Project>, DatabaseError> {
        Err(unavailable())
    }

    async fn insert(&self, _project: NewProject) -> Result<Project, DatabaseError> {
        Err(unavailable())
    }

    async fn update_owned(
        &self,
        _id: &ProjectId,
        _owner: &str,
        _update: ProjectUpdate,
    ) -> Result<Option<Project>, DatabaseError> {
        Err(unavailable())
    }

    async fn delete_owned(&self, _id: &ProjectId, _owner: &str) -> Result<bool, DatabaseError> {
        Err(unavailable())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Err(unavailable())
    }
}

pub fn test_keys() -> JwtKeys {
    JwtKeys::new(TEST_SECRET, 1)
}

pub fn test_state(repo: Arc<dyn ProjectRepository>) -> AppState {
    let mut config = AppConfig::from_env();
    config.security.jwt_secret = TEST_SECRET.to_string();
    config.security.cors_origins = vec!["http://localhost:5173".to_string()];
    AppState::new(repo, test_keys(), Arc::new(config))
}

/// `Authorization` header value for the given user
pub fn bearer(user_id: &str) -> String {
    let token = test_keys()
        .generate_jwt(user_id)
        .unwrap_or_else(|e| panic!("failed to mint test token: {}", e));
    format!("Bearer {}", token)
}
