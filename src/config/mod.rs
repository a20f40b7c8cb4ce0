use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    /// Create the projects table on startup when it is missing
    pub bootstrap_schema: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StorageBackend::Postgres),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mode = env::var("APP_ENV").or_else(|_| env::var("NODE_ENV"));
        let environment = match mode.as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_BOOTSTRAP_SCHEMA") {
            self.database.bootstrap_schema = v.parse().unwrap_or(self.database.bootstrap_schema);
        }

        // Storage overrides
        if let Ok(v) = env::var("STORAGE_BACKEND") {
            self.storage.backend = v.parse().unwrap_or(self.storage.backend);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_origins(&v);
        }
        if let Ok(v) = env::var("FRONTEND_URL") {
            let v = v.trim().to_string();
            if !v.is_empty() && !self.security.cors_origins.contains(&v) {
                self.security.cors_origins.push(v);
            }
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                bootstrap_schema: true,
            },
            storage: StorageConfig {
                backend: StorageBackend::Postgres,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
                cors_origins: vec![
                    "http://localhost:5173".to_string(),
                    "http://localhost:3001".to_string(),
                ],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                bootstrap_schema: true,
            },
            storage: StorageConfig {
                backend: StorageBackend::Postgres,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cors_origins: vec![],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                bootstrap_schema: false,
            },
            storage: StorageConfig {
                backend: StorageBackend::Postgres,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
                cors_origins: vec!["https://cipher-studio-xi.vercel.app".to_string()],
            },
        }
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
