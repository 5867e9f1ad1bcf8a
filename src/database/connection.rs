use crate::config::StoreConfig;
use crate::error::{AppError, AppResult};
use reqwest::Url;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

pub type DbPool = DatabaseConnection;

pub async fn create_pool(config: &StoreConfig) -> AppResult<DbPool> {
    let url = connection_url(&config.url, &config.service_key)?;
    let mut options = ConnectOptions::new(url);
    options
        .max_connections(config.max_connections)
        .sqlx_logging(false);

    let pool = Database::connect(options).await?;
    Ok(pool)
}

/// URL 中未带密码时使用 service key 作为密码
fn connection_url(url: &str, service_key: &str) -> AppResult<String> {
    let mut parsed = Url::parse(url)
        .map_err(|e| AppError::ConfigError(format!("Invalid database url: {e}")))?;

    if parsed.password().is_none() && !service_key.is_empty() {
        parsed
            .set_password(Some(service_key))
            .map_err(|_| AppError::ConfigError("Database url cannot carry a password".into()))?;
    }

    Ok(parsed.to_string())
}
