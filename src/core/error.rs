//! 核心错误处理模块

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// 字段名 -> 第一条错误消息
pub type FieldErrors = BTreeMap<String, String>;

/// 核心错误类型
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// message 是按规则顺序排在最前的那条字段错误
    #[error("{message}")]
    Validation { message: String, errors: FieldErrors },
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("render error: {0}")]
    Render(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// 错误响应结构
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
    pub timestamp: String,
}

/// 422 响应结构，errors 按字段给出
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub message: String,
    pub errors: FieldErrors,
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let (status, error_message, user_message) = match self {
            CoreError::Validation { message, errors } => {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(ValidationResponse { message, errors }),
                )
                    .into_response();
            }
            CoreError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            CoreError::Storage(msg) => {
                error!("Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Storage error".to_string(),
                )
            }
            CoreError::Render(msg) | CoreError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let error_response = ErrorResponse {
            error: error_message.to_string(),
            message: user_message,
            code: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(error_response)).into_response()
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}

impl From<askama::Error> for CoreError {
    fn from(err: askama::Error) -> Self {
        CoreError::Render(err.to_string())
    }
}
