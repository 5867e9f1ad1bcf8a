use crate::config::LineConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// 公钥缓存有效期
const JWKS_MAX_AGE: Duration = Duration::from_secs(600);
/// 遇到未知 kid 时两次拉取之间的最短间隔
const JWKS_REFETCH_COOLDOWN: Duration = Duration::from_secs(30);

/// LINE Login ID token 中用到的 claims
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineIdTokenClaims {
    pub iss: String,
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// ID token 校验接口, 成功时返回 claims
#[async_trait]
pub trait IdTokenVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> AppResult<LineIdTokenClaims>;
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

impl CachedKeys {
    fn lookup(&self, kid: &str) -> Option<Jwk> {
        self.keys.find(kid).cloned()
    }
}

pub struct LineIdTokenVerifier {
    http: Client,
    config: LineConfig,
    cache: RwLock<Option<CachedKeys>>,
}

impl LineIdTokenVerifier {
    pub fn new(config: LineConfig) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent("line-lottery/jwks")
            .build()?;
        Ok(Self {
            http,
            config,
            cache: RwLock::new(None),
        })
    }

    /// 使用已有的公钥集合初始化缓存
    pub fn with_keys(config: LineConfig, keys: JwkSet) -> AppResult<Self> {
        let mut verifier = Self::new(config)?;
        verifier.cache = RwLock::new(Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        }));
        Ok(verifier)
    }

    async fn fetch_keys(&self) -> AppResult<JwkSet> {
        log::info!("Fetching LINE signing keys from {}", self.config.jwks_url);
        let response = self.http.get(&self.config.jwks_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "JWKS fetch failed: HTTP {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        Ok(response.json::<JwkSet>().await?)
    }

    async fn find_key(&self, kid: &str) -> AppResult<Jwk> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                let age = cached.fetched_at.elapsed();
                if age < JWKS_MAX_AGE {
                    if let Some(jwk) = cached.lookup(kid) {
                        return Ok(jwk);
                    }
                    if age < JWKS_REFETCH_COOLDOWN {
                        return Err(AppError::AuthError(format!("Unknown key id: {kid}")));
                    }
                }
            }
        }

        let mut cache = self.cache.write().await;
        // 等待写锁期间可能已被其它请求刷新
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < JWKS_REFETCH_COOLDOWN {
                return cached
                    .lookup(kid)
                    .ok_or_else(|| AppError::AuthError(format!("Unknown key id: {kid}")));
            }
        }

        let fresh = CachedKeys {
            keys: self.fetch_keys().await?,
            fetched_at: Instant::now(),
        };
        let found = fresh.lookup(kid);
        *cache = Some(fresh);

        found.ok_or_else(|| AppError::AuthError(format!("Unknown key id: {kid}")))
    }
}

#[async_trait]
impl IdTokenVerifier for LineIdTokenVerifier {
    async fn verify(&self, id_token: &str) -> AppResult<LineIdTokenClaims> {
        if id_token.is_empty() {
            return Err(AppError::AuthError("Missing id token".into()));
        }

        let header = decode_header(id_token)?;

        if matches!(
            header.alg,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AppError::AuthError(format!(
                "Symmetric algorithm not accepted: {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::AuthError("Id token has no key id".into()))?;
        let jwk = self.find_key(&kid).await?;
        let key = DecodingKey::from_jwk(&jwk)
            .map_err(|e| AppError::AuthError(format!("Unusable signing key {kid}: {e}")))?;

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_audience(&[self.config.client_id.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let data = decode::<LineIdTokenClaims>(id_token, &key, &validation)?;

        Ok(data.claims)
    }
}
