use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::AppError;
use crate::handlers::validation::{
    check_address, check_name, check_number, check_password, check_tag, parse_role, provided,
};
use crate::models::user::{Role, UserFields, UserInfo};
use crate::response::{success, ApiResponse};
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub password: String,
}

/// 注册与管理员新增用户共用的请求体
#[derive(Deserialize)]
pub struct RegisterPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub password: String,
    pub address: Option<String>,
    pub tag: Option<String>,
    pub role: Option<String>,
}

/// 将 JSON 解析失败统一转为 422
pub fn bind<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(p)| p)
        .map_err(|e| AppError::validation(e.body_text()))
}

/// 用户登录：用户名 + 手机号定位用户，再校验密码
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let payload = bind(payload)?;

    check_number(&payload.number)?;
    check_password(&payload.password)?;

    let user = state.store.login(&payload.name, &payload.number).await?;

    if !state.passwords.verify(&payload.password, &user.password) {
        tracing::info!("登录失败，密码错误: name={}", payload.name);
        return Err(AppError::WrongPassword);
    }

    let token = state.tokens.issue(&user)?;
    tracing::info!("用户登录成功: id={}", user.id);

    Ok(success(Some(json!({ "token": token })), "登录成功"))
}

/// 用户注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterPayload>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let payload = bind(payload)?;
    let info = create_user(&state, payload).await?;
    Ok(success(Some(json!({ "user": info })), "注册成功！"))
}

/// 校验并写入新用户，角色缺省为普通用户
pub async fn create_user(state: &AppState, payload: RegisterPayload) -> Result<UserInfo, AppError> {
    let role = match provided(payload.role) {
        Some(raw) => parse_role(&raw)?,
        None => Role::Normal,
    };

    check_name(&payload.name)?;
    check_number(&payload.number)?;
    check_password(&payload.password)?;

    let address = provided(payload.address);
    if let Some(address) = address.as_deref() {
        check_address(address)?;
    }
    let tag = provided(payload.tag);
    if let Some(tag) = tag.as_deref() {
        check_tag(tag)?;
    }

    let password = state.passwords.hash(&payload.password).map_err(AppError::internal)?;

    let user = state
        .store
        .add_user(UserFields {
            name: payload.name,
            number: payload.number,
            password,
            address,
            tag,
            role,
        })
        .await?;

    Ok(UserInfo::from(&user))
}
