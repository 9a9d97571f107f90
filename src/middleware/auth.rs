use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::user::User;
use crate::services::user_store::StoreError;
use crate::AppState;

/// 通过认证的当前用户，由守卫写入请求扩展
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// token 守卫：校验 Bearer Token 并加载用户
pub async fn guard(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // 1. 提取 Bearer Token
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::Unauthorized("缺少 Bearer Token".into()))?;

    // 2. 校验签名与有效期
    let claims = state.tokens.verify(bearer.token())?;

    // 3. 按 claims 中的 id 加载用户
    let user = match state.store.get_user_by_id(claims.user_id).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => {
            return Err(AppError::Unauthorized(format!("用户 {} 已不存在", claims.user_id)))
        }
        Err(e) => return Err(e.into()),
    };

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}
