use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{auth_handler, user_handler};
use crate::middleware;
use crate::AppState;

/// 健康检查 Handler：用于运维平台监测服务可用性
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "up", "database": "connected" })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: database error: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "down", "error": "database_error" })),
            )
        }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/login", post(auth_handler::login))
        .route("/register", post(auth_handler::register))
        .route("/user/list", get(user_handler::user_list));

    // 需要 token 的接口
    let user_routes = Router::new()
        .route("/user/info", get(user_handler::user_info))
        .route("/user/add", post(user_handler::add_user))
        .route(
            "/user/:id",
            get(user_handler::get_user)
                .put(user_handler::update_user)
                .delete(user_handler::delete_user),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::guard,
        ));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .with_state(state)
        .layer(CatchPanicLayer::custom(middleware::recovery::handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
