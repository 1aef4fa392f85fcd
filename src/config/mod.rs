use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    /// Version used when neither the media type nor `api-version` pick one.
    pub default_api_version: u8,
    /// Prefix for absolute link hrefs; relative hrefs when unset.
    pub public_base_url: Option<String>,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// No URL means the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub apply_schema_on_startup: bool,
    /// Insert the demo habits after connecting.
    pub seed_on_startup: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment preset first, then individual variables on top
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        override_from_env("HOST", &mut self.server.host);
        override_from_env("PORT", &mut self.server.port);

        override_from_env("API_DEFAULT_PAGE_SIZE", &mut self.api.default_page_size);
        override_from_env("API_MAX_PAGE_SIZE", &mut self.api.max_page_size);
        override_from_env("API_DEFAULT_VERSION", &mut self.api.default_api_version);
        override_from_env("API_ENABLE_REQUEST_LOGGING", &mut self.api.enable_request_logging);
        if let Ok(v) = env::var("API_PUBLIC_BASE_URL") {
            self.api.public_base_url = Some(v).filter(|v| !v.trim().is_empty());
        }

        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|v| !v.trim().is_empty());
        }
        override_from_env("DATABASE_MAX_CONNECTIONS", &mut self.database.max_connections);
        override_from_env("DATABASE_CONNECTION_TIMEOUT", &mut self.database.connection_timeout);
        override_from_env("DATABASE_APPLY_SCHEMA", &mut self.database.apply_schema_on_startup);
        override_from_env("DATABASE_SEED", &mut self.database.seed_on_startup);

        override_from_env("SECURITY_ENABLE_CORS", &mut self.security.enable_cors);
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }

        if self.api.max_page_size < self.api.default_page_size {
            tracing::warn!(
                "API_MAX_PAGE_SIZE ({}) below default page size ({}), raising it",
                self.api.max_page_size,
                self.api.default_page_size
            );
            self.api.max_page_size = self.api.default_page_size;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            api: ApiConfig {
                default_page_size: 10,
                max_page_size: 100,
                default_api_version: 1,
                public_base_url: None,
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                apply_schema_on_startup: true,
                seed_on_startup: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            api: ApiConfig {
                default_page_size: 10,
                max_page_size: 100,
                default_api_version: 1,
                public_base_url: None,
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                apply_schema_on_startup: true,
                seed_on_startup: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.devhabit.example".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            api: ApiConfig {
                default_page_size: 10,
                max_page_size: 50,
                default_api_version: 1,
                public_base_url: None,
                enable_request_logging: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                apply_schema_on_startup: false,
                seed_on_startup: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.devhabit.example".to_string()],
            },
        }
    }
}

/// Replace `target` with the parsed variable; unparsable values keep the preset.
fn override_from_env<T: FromStr>(var: &str, target: &mut T) {
    if let Ok(raw) = env::var(var) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => tracing::warn!("Ignoring {}={:?}: not a valid value", var, raw),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
