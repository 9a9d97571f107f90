use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::AppError;
use crate::handlers::auth_handler::{bind, create_user, RegisterPayload};
use crate::handlers::validation::{
    check_address, check_name, check_number, check_password, check_tag, parse_role, provided,
};
use crate::middleware::auth::CurrentUser;
use crate::models::user::{PageQuery, User, UserFields, UserInfo};
use crate::response::{success, ApiResponse};
use crate::AppState;

const DEFAULT_PAGE_NUM: i64 = 1;
const DEFAULT_PAGE_SIZE: i64 = 3;

// 列表查询参数，数字解析失败或小于 1 时回退默认值
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page_num: Option<String>,
    pub page_size: Option<String>,
    pub name: Option<String>,
    pub number: Option<String>,
}

impl ListQuery {
    fn into_page_query(self) -> PageQuery {
        let positive = |raw: Option<String>, default: i64| {
            raw.and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|n| *n >= 1)
                .unwrap_or(default)
        };
        PageQuery {
            page_num: positive(self.page_num, DEFAULT_PAGE_NUM),
            page_size: positive(self.page_size, DEFAULT_PAGE_SIZE),
            name: provided(self.name),
            number: provided(self.number),
        }
    }
}

/// 部分更新请求体：缺省或空字符串的字段保持原值
#[derive(Deserialize, Default)]
pub struct UpdatePayload {
    pub name: Option<String>,
    pub number: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub tag: Option<String>,
    pub role: Option<String>,
}

fn parse_id(id: Result<Path<i32>, PathRejection>) -> Result<i32, AppError> {
    id.map(|Path(id)| id)
        .map_err(|_| AppError::BadRequest("无效的id".into()))
}

/// 当前登录用户的个人信息
pub async fn user_info(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<ApiResponse> {
    success(Some(json!({ "user": UserInfo::from(&user) })), "查询成功")
}

/// 分页获取用户列表
pub async fn user_list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::validation(e.body_text()))?;
    let query = query.into_page_query();
    let page = state.store.get_user_page(&query).await?;

    let list: Vec<UserInfo> = page.items.iter().map(UserInfo::from).collect();
    Ok(success(Some(json!({ "userList": list, "total": page.total })), "查询成功"))
}

/// 按 id 查询用户
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let id = parse_id(id)?;
    let user = state.store.get_user_by_id(id).await?;
    Ok(success(Some(json!({ "userInfo": UserInfo::from(&user) })), "查询成功!"))
}

/// 已登录用户新增用户
pub async fn add_user(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(operator)): Extension<CurrentUser>,
    payload: Result<Json<RegisterPayload>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let payload = bind(payload)?;
    let info = create_user(&state, payload).await?;
    tracing::info!("用户 {} 新增了用户 {}", operator.id, info.id);
    Ok(success(Some(json!({ "user": info })), "注册成功！"))
}

/// 删除用户，id 不存在同样返回成功
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let id = parse_id(id)?;
    state.store.delete_user(id).await?;
    Ok(success(None, "删除成功!"))
}

/// 更新用户：先取出现有记录，把未提供的字段补齐后整行覆盖
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdatePayload>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let id = parse_id(id)?;
    let existing = state.store.get_user_by_id(id).await?;
    let patch = bind(payload)?;

    let fields = merge(&state, &existing, patch)?;
    state.store.update_user(id, fields).await?;

    tracing::info!("更新用户: id={}", id);
    Ok(success(None, "更新成功"))
}

fn merge(state: &AppState, existing: &User, patch: UpdatePayload) -> Result<UserFields, AppError> {
    let mut fields = UserFields::from(existing);

    if let Some(name) = provided(patch.name) {
        check_name(&name)?;
        fields.name = name;
    }
    if let Some(number) = provided(patch.number) {
        check_number(&number)?;
        fields.number = number;
    }
    if let Some(password) = provided(patch.password) {
        check_password(&password)?;
        fields.password = state.passwords.hash(&password).map_err(AppError::internal)?;
    }
    if let Some(address) = provided(patch.address) {
        check_address(&address)?;
        fields.address = Some(address);
    }
    if let Some(tag) = provided(patch.tag) {
        check_tag(&tag)?;
        fields.tag = Some(tag);
    }
    if let Some(role) = provided(patch.role) {
        fields.role = parse_role(&role)?;
    }

    Ok(fields)
}
