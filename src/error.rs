use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::response::ApiResponse;
use crate::services::token_service::TokenError;
use crate::services::user_store::StoreError;

pub const SYSTEM_ERROR: &str = "系统异常";
pub const FORBIDDEN: &str = "权限不足";

/// 接口层错误。业务失败沿用 HTTP 200 + code 400 的约定
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("手机号或者用户名已存在")]
    AlreadyExists,
    #[error("密码不正确,请重新输入")]
    WrongPassword,
    #[error("认证失败: {0}")]
    Unauthorized(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        AppError::Internal(detail.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => AppError::NotFound(StoreError::NotFound.to_string()),
            StoreError::AlreadyExists => AppError::AlreadyExists,
            StoreError::Database(err) => AppError::internal(err),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Signing(err) => AppError::internal(format!("token generate error: {}", err)),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiResponse::new(422, None, msg.clone()),
            ),
            AppError::Unauthorized(reason) => {
                tracing::warn!("请求被拒绝: {}", reason);
                (StatusCode::UNAUTHORIZED, ApiResponse::new(401, None, FORBIDDEN))
            }
            AppError::Internal(detail) => {
                tracing::error!("系统异常: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, ApiResponse::new(500, None, SYSTEM_ERROR))
            }
            other => (StatusCode::OK, ApiResponse::fail(other.to_string())),
        };
        (status, Json(body)).into_response()
    }
}
