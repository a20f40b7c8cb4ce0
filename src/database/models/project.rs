use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub files: Value,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a new row; id and timestamps are assigned by the repository
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub files: Value,
    pub user_id: String,
}

/// Full replacement of the mutable columns, produced by merging a partial update
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectUpdate {
    pub name: String,
    pub description: String,
    pub files: Value,
}
