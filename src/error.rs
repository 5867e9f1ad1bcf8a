use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::handlers::ALLOW_ORIGIN;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Unknown action: {0:?}")]
    UnknownAction(Option<String>),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::UnknownAction(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalApiError(_) | AppError::ReqwestError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                "Invalid token".to_string()
            }
            AppError::JwtError(err) => {
                log::warn!("Authentication error: {err}");
                "Invalid token".to_string()
            }
            AppError::UnknownAction(act) => {
                log::warn!("Unknown act: {act:?}");
                "unknown act".to_string()
            }
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                msg.clone()
            }
            AppError::ExternalApiError(_) | AppError::ReqwestError(_) => {
                log::error!("Upstream error: {self}");
                "Upstream service unavailable".to_string()
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "Internal server error".to_string()
            }
            _ => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
        };

        let status = self.status_code();
        let mut builder = HttpResponse::build(status);
        // A rejected token gets no CORS header.
        if status != StatusCode::UNAUTHORIZED {
            builder.insert_header(ALLOW_ORIGIN);
        }
        builder.json(json!({ "error": message }))
    }
}
