use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub frontend: FrontendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum cached code lookups; 0 disables the cache
    pub max_entries: u64,
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Directory holding an `index.html` that replaces the embedded landing page
    pub static_dir: Option<String>,
    /// Directory served under `/public`
    pub public_dir: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            static_dir: None,
            public_dir: "public".to_string(),
        }
    }
}

impl CacheConfig {
    pub fn enabled(&self) -> bool {
        self.max_entries > 0
    }
}

impl DatabaseBackend {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            "memory" => DatabaseBackend::Memory,
            "sqlite" => DatabaseBackend::Sqlite,
            other => {
                tracing::warn!(
                    "Unknown DATABASE_BACKEND '{other}', falling back to 'sqlite'. Supported values: sqlite, postgres, memory"
                );
                DatabaseBackend::Sqlite
            }
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend = DatabaseBackend::parse(
            &std::env::var("DATABASE_BACKEND").unwrap_or_else(|_| "sqlite".to_string()),
        );

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./shorturl.db?mode=rwc".to_string());

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let cache_max_entries = std::env::var("CACHE_MAX_ENTRIES")
            .unwrap_or_else(|_| "10000".to_string())
            .parse::<u64>()
            .context("CACHE_MAX_ENTRIES must be a non-negative integer")?;
        let cache_ttl_secs = std::env::var("CACHE_TTL_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse::<u64>()
            .context("CACHE_TTL_SECS must be a non-negative integer")?;

        let static_dir = std::env::var("FRONTEND_STATIC_DIR").ok();
        let public_dir = std::env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string());

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
            },
            server: ServerConfig { host, port },
            cache: CacheConfig {
                max_entries: cache_max_entries,
                ttl_secs: cache_ttl_secs,
            },
            frontend: FrontendConfig {
                static_dir,
                public_dir,
            },
        })
    }
}
