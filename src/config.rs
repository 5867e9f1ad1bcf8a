use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_LINE_ISSUER: &str = "https://access.line.me";
pub const DEFAULT_LINE_JWKS_URL: &str = "https://api.line.me/oauth2/v2.1/keys";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub line: LineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// PostgREST endpoint of a managed Postgres project
    #[default]
    Rest,
    /// Direct Postgres connection
    Postgres,
}

impl std::str::FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" | "supabase" => Ok(StoreBackend::Rest),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            other => Err(AppError::ConfigError(format!(
                "Unsupported store backend: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    pub url: String,
    pub service_key: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineConfig {
    pub client_id: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_jwks_url")]
    pub jwks_url: String,
}

fn default_max_connections() -> u32 {
    10
}

fn default_issuer() -> String {
    DEFAULT_LINE_ISSUER.to_string()
}

fn default_jwks_url() -> String {
    DEFAULT_LINE_JWKS_URL.to_string()
}

impl Config {
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            // No file: everything comes from the environment.
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env_only(),
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "Cannot read config file {config_path}: {e}"
                )));
            }
        };

        let config = config.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(config_str: &str) -> AppResult<Self> {
        toml::from_str(config_str)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {e}")))
    }

    fn from_env_only() -> Self {
        fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
            env::var(name)
                .ok()
                .and_then(|v| v.parse::<T>().ok())
                .unwrap_or(default)
        }

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 8080u16),
            },
            store: StoreConfig {
                backend: StoreBackend::default(),
                url: String::new(),
                service_key: String::new(),
                max_connections: default_max_connections(),
            },
            line: LineConfig {
                client_id: String::new(),
                issuer: default_issuer(),
                jwks_url: default_jwks_url(),
            },
        }
    }

    fn with_env_overrides(mut self) -> AppResult<Self> {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(p) = env::var("SERVER_PORT").ok().and_then(|v| v.parse().ok()) {
            self.server.port = p;
        }
        if let Ok(v) = env::var("STORE_BACKEND") {
            self.store.backend = v.parse()?;
        }
        if let Ok(v) = env::var("SUPABASE_URL").or_else(|_| env::var("DATABASE_URL")) {
            self.store.url = v;
        }
        if let Ok(v) = env::var("SUPABASE_SERVICE_ROLE_KEY") {
            self.store.service_key = v;
        }
        if let Some(mc) = env::var("DB_MAX_CONNECTIONS").ok().and_then(|v| v.parse().ok()) {
            self.store.max_connections = mc;
        }
        if let Ok(v) = env::var("LINE_CLIENT_ID") {
            self.line.client_id = v;
        }
        if let Ok(v) = env::var("LINE_ISSUER") {
            self.line.issuer = v;
        }
        if let Ok(v) = env::var("LINE_JWKS_URL") {
            self.line.jwks_url = v;
        }
        Ok(self)
    }

    pub fn validate(&self) -> AppResult<()> {
        let required = [
            ("SUPABASE_URL", &self.store.url),
            ("SUPABASE_SERVICE_ROLE_KEY", &self.store.service_key),
            ("LINE_CLIENT_ID", &self.line.client_id),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::ConfigError(format!(
                "Missing required configuration: {}",
                missing.join(", ")
            )))
        }
    }
}
