use crate::config::StoreConfig;
use crate::error::{AppError, AppResult};
use crate::models::{NewWinner, WinnerRecord};
use crate::services::WinnerStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::json;

const WINNERS_TABLE: &str = "winners";

/// 通过 PostgREST (Supabase REST API) 访问 winners 表
#[derive(Clone)]
pub struct SupabaseWinnerStore {
    http: Client,
    table_url: String,
    service_key: String,
}

impl SupabaseWinnerStore {
    pub fn new(config: &StoreConfig) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent("line-lottery/store")
            .build()?;
        Ok(Self {
            http,
            table_url: format!(
                "{}/rest/v1/{}",
                config.url.trim_end_matches('/'),
                WINNERS_TABLE
            ),
            service_key: config.service_key.clone(),
        })
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.http
            .request(method, &self.table_url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn read_rows(response: Response, operation: &str) -> AppResult<Vec<WinnerRecord>> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Store {operation} failed: HTTP {}: {}", status.as_u16(), error_text);
            return Err(AppError::ExternalApiError(format!(
                "Store {operation} failed: HTTP {}",
                status.as_u16()
            )));
        }
        Ok(response.json::<Vec<WinnerRecord>>().await?)
    }
}

#[async_trait]
impl WinnerStore for SupabaseWinnerStore {
    async fn insert(&self, record: NewWinner) -> AppResult<WinnerRecord> {
        let response = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(&record)
            .send()
            .await?;

        Self::read_rows(response, "insert")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::InternalError("Insert returned no row".into()))
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<WinnerRecord>> {
        let response = self
            .request(Method::GET)
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("order", "id.desc".to_string()),
            ])
            .send()
            .await?;

        Self::read_rows(response, "select").await
    }

    async fn mark_redeemed(&self, id: i64, at: DateTime<Utc>) -> AppResult<u64> {
        let response = self
            .request(Method::PATCH)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&json!({ "redeemed": true, "redeemed_at": at }))
            .send()
            .await?;

        Ok(Self::read_rows(response, "update").await?.len() as u64)
    }
}
