use serde::Deserialize;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub database: DatabaseSettings,
    pub worker: WorkerSettings,
    pub auth: AuthSettings,
    pub baselines: BaselineSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    /// Origin prefixed onto locally issued signed URLs.
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub root_path: String,
    pub upload_ttl_secs: i64,
    pub download_ttl_secs: i64,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub backend: DatabaseBackend,
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// `token=owner-uuid` pairs, comma separated.
    pub tokens: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaselineSettings {
    /// Optional path to a JSON baselines file; built-in profiles are used
    /// when unset.
    pub profiles_path: Option<String>,
}

impl Settings {
    /// Environment-driven configuration with local-development defaults.
    pub fn from_env() -> Result<Self, String> {
        let port = env_or("SERVER_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| format!("invalid SERVER_PORT: {}", e))?;
        let host = env_or("SERVER_HOST", "0.0.0.0");
        let public_base_url =
            env_or("PUBLIC_BASE_URL", &format!("http://localhost:{}", port));

        let backend = match env_or("DATABASE_BACKEND", "memory").to_lowercase().as_str() {
            "memory" => DatabaseBackend::Memory,
            "postgres" => DatabaseBackend::Postgres,
            other => return Err(format!("invalid DATABASE_BACKEND: {}", other)),
        };

        Ok(Self {
            server: ServerSettings {
                host,
                port,
                environment: Environment::try_from(env_or("APP_ENV", "local"))?,
                public_base_url,
            },
            storage: StorageSettings {
                root_path: env_or("STORAGE_ROOT", "./data/artifacts"),
                upload_ttl_secs: env_or("UPLOAD_TTL_SECS", "900")
                    .parse()
                    .map_err(|e| format!("invalid UPLOAD_TTL_SECS: {}", e))?,
                download_ttl_secs: env_or("DOWNLOAD_TTL_SECS", "3600")
                    .parse()
                    .map_err(|e| format!("invalid DOWNLOAD_TTL_SECS: {}", e))?,
            },
            database: DatabaseSettings {
                backend,
                url: std::env::var("DATABASE_URL").ok(),
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", "5")
                    .parse()
                    .map_err(|e| format!("invalid DATABASE_MAX_CONNECTIONS: {}", e))?,
            },
            worker: WorkerSettings {
                queue_capacity: env_or("WORKER_QUEUE_CAPACITY", "64")
                    .parse()
                    .map_err(|e| format!("invalid WORKER_QUEUE_CAPACITY: {}", e))?,
            },
            auth: AuthSettings {
                tokens: env_or("AUTH_TOKENS", ""),
            },
            baselines: BaselineSettings {
                profiles_path: std::env::var("BASELINE_PROFILES_PATH").ok(),
            },
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
