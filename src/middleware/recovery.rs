use axum::response::{IntoResponse, Response};
use std::any::Any;

use crate::error::AppError;

/// CatchPanicLayer 的响应：记录 panic 内容，返回 500 信封
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Internal(format!("handler panicked: {}", detail)).into_response()
}
