//! In-process fakes for the verifier and the winners store.

use crate::error::{AppError, AppResult};
use crate::external::{IdTokenVerifier, LineIdTokenClaims};
use crate::models::{NewWinner, WinnerRecord};
use crate::services::WinnerStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Accepts only the tokens it was built with, mapping each to a subject.
#[derive(Default)]
pub struct StaticVerifier {
    subjects: HashMap<String, String>,
    calls: AtomicUsize,
}

impl StaticVerifier {
    pub fn with_token(mut self, token: &str, subject: &str) -> Self {
        self.subjects.insert(token.to_string(), subject.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdTokenVerifier for StaticVerifier {
    async fn verify(&self, id_token: &str) -> AppResult<LineIdTokenClaims> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let sub = self
            .subjects
            .get(id_token)
            .ok_or_else(|| AppError::AuthError("unknown test token".into()))?;
        Ok(LineIdTokenClaims {
            iss: crate::config::DEFAULT_LINE_ISSUER.to_string(),
            sub: sub.clone(),
            exp: Utc::now().timestamp() + 3600,
            iat: None,
            name: None,
            picture: None,
            email: None,
        })
    }
}

/// Vec-backed winners table with sequential ids starting at 1.
#[derive(Default)]
pub struct InMemoryWinnerStore {
    rows: Mutex<Vec<WinnerRecord>>,
    calls: AtomicUsize,
}

impl InMemoryWinnerStore {
    pub fn rows(&self) -> Vec<WinnerRecord> {
        self.rows.lock().unwrap().clone()
    }

    /// Number of store operations performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WinnerStore for InMemoryWinnerStore {
    async fn insert(&self, record: NewWinner) -> AppResult<WinnerRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let row = WinnerRecord {
            id: rows.len() as i64 + 1,
            user_id: record.user_id,
            prize: record.prize.to_string(),
            name: record.name,
            phone: record.phone,
            created_at: record.created_at,
            redeemed: None,
            redeemed_at: None,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<WinnerRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut found: Vec<WinnerRecord> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(found)
    }

    async fn mark_redeemed(&self, id: i64, at: DateTime<Utc>) -> AppResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let mut affected = 0;
        for row in rows.iter_mut().filter(|r| r.id == id) {
            row.redeemed = Some(true);
            row.redeemed_at = Some(at);
            affected += 1;
        }
        Ok(affected)
    }
}

/// A store whose every call fails, for dependency-failure paths.
pub struct FailingWinnerStore;

#[async_trait]
impl WinnerStore for FailingWinnerStore {
    async fn insert(&self, _record: NewWinner) -> AppResult<WinnerRecord> {
        Err(AppError::DatabaseError(sea_orm::DbErr::Custom("connection reset".into())))
    }

    async fn find_by_user(&self, _user_id: &str) -> AppResult<Vec<WinnerRecord>> {
        Err(AppError::ExternalApiError("HTTP 503".into()))
    }

    async fn mark_redeemed(&self, _id: i64, _at: DateTime<Utc>) -> AppResult<u64> {
        Err(AppError::DatabaseError(sea_orm::DbErr::Custom("connection reset".into())))
    }
}
