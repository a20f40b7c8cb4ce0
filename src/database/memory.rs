use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::project::{NewProject, Project, ProjectUpdate};
use crate::database::repository::ProjectRepository;
use crate::types::ProjectId;

#[derive(Default)]
struct MemoryState {
    projects: HashMap<String, Project>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Strictly increasing clock so `updated_at` ordering is total within the process
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(next);
        next
    }
}

/// Process-local project storage with the same ownership semantics as Postgres
#[derive(Default)]
pub struct MemoryProjectRepository {
    state: RwLock<MemoryState>,
}

impl MemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectRepository for MemoryProjectRepository {
    async fn list_owned(&self, owner: &str) -> Result<Vec<Project>, DatabaseError> {
        let state = self.state.read().await;
        let mut projects: Vec<Project> = state
            .projects
            .values()
            .filter(|p| p.user_id == owner)
            .cloned()
            .collect();

        projects.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(projects)
    }

    async fn find_owned(&self, id: &ProjectId, owner: &str) -> Result<Option<Project>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .projects
            .get(id.as_str())
            .filter(|p| p.user_id == owner)
            .cloned())
    }

    async fn insert(&self, project: NewProject) -> Result<Project, DatabaseError> {
        let mut state = self.state.write().await;
        let now = state.tick();

        let mut id = ProjectId::generate();
        while state.projects.contains_key(id.as_str()) {
            id = ProjectId::generate();
        }

        let created = Project {
            id: id.to_string(),
            name: project.name,
            description: project.description,
            files: project.files,
            user_id: project.user_id,
            created_at: now,
            updated_at: now,
        };
        state.projects.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn update_owned(
        &self,
        id: &ProjectId,
        owner: &str,
        update: ProjectUpdate,
    ) -> Result<Option<Project>, DatabaseError> {
        let mut state = self.state.write().await;
        let now = state.tick();

        let Some(project) = state
            .projects
            .get_mut(id.as_str())
            .filter(|p| p.user_id == owner)
        else {
            return Ok(None);
        };

        project.name = update.name;
        project.description = update.description;
        project.files = update.files;
        project.updated_at = now;
        Ok(Some(project.clone()))
    }

    async fn delete_owned(&self, id: &ProjectId, owner: &str) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        let owned = state
            .projects
            .get(id.as_str())
            .is_some_and(|p| p.user_id == owner);

        if owned {
            state.projects.remove(id.as_str());
        }
        Ok(owned)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_project(name: &str, owner: &str) -> NewProject {
        NewProject {
            name: name.to_string(),
            description: String::new(),
            files: json!({}),
            user_id: owner.to_string(),
        }
    }

    #[tokio::test]
    async fn lists_only_owned_projects_newest_first() {
        let repo = MemoryProjectRepository::new();
        let first = repo.insert(new_project("first", "alice")).await.unwrap();
        let second = repo.insert(new_project("second", "alice")).await.unwrap();
        repo.insert(new_project("other", "bob")).await.unwrap();

        let listed = repo.list_owned("alice").await.unwrap();
        let names: Vec<_> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["second", "first"]);

        let id = ProjectId::parse(&first.id).unwrap();
        let update = ProjectUpdate {
            name: first.name.clone(),
            description: "touched".to_string(),
            files: first.files.clone(),
        };
        repo.update_owned(&id, "alice", update).await.unwrap();

        let listed = repo.list_owned("alice").await.unwrap();
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
    }

    #[tokio::test]
    async fn foreign_rows_behave_like_missing_rows() {
        let repo = MemoryProjectRepository::new();
        let created = repo.insert(new_project("mine", "alice")).await.unwrap();
        let id = ProjectId::parse(&created.id).unwrap();

        assert!(repo.find_owned(&id, "bob").await.unwrap().is_none());
        assert!(!repo.delete_owned(&id, "bob").await.unwrap());

        let update = ProjectUpdate {
            name: "stolen".to_string(),
            description: String::new(),
            files: json!({}),
        };
        assert!(repo.update_owned(&id, "bob", update).await.unwrap().is_none());

        let still_there = repo.find_owned(&id, "alice").await.unwrap().unwrap();
        assert_eq!(still_there.name, "mine");
    }

    #[tokio::test]
    async fn delete_removes_row_once() {
        let repo = MemoryProjectRepository::new();
        let created = repo.insert(new_project("gone", "alice")).await.unwrap();
        let id = ProjectId::parse(&created.id).unwrap();

        assert!(repo.delete_owned(&id, "alice").await.unwrap());
        assert!(!repo.delete_owned(&id, "alice").await.unwrap());
        assert!(repo.find_owned(&id, "alice").await.unwrap().is_none());
    }
}
