use axum::Json;
use serde::Serialize;
use serde_json::Value;

/// 统一响应信封 {code, data, message}
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub code: u16,
    pub data: Option<Value>,
    pub message: String,
}

impl ApiResponse {
    pub fn new(code: u16, data: Option<Value>, message: impl Into<String>) -> Self {
        Self { code, data, message: message.into() }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(400, None, message)
    }
}

pub fn success(data: Option<Value>, message: &str) -> Json<ApiResponse> {
    Json(ApiResponse::new(200, data, message))
}
