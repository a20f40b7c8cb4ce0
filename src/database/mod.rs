pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryProjectRepository;
pub use models::project::{NewProject, Project, ProjectUpdate};
pub use repository::{PgProjectRepository, ProjectRepository};
