use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// 声明子模块
mod config;
mod error;
mod handlers;
mod middleware;
mod models;
mod response;
mod routes;
mod services;

use config::{AdminSeed, Config};
use handlers::validation::{check_number, check_password};
use models::user::{Role, UserFields};
use services::password::Passwords;
use services::token_service::TokenService;
use services::user_store::{PgUserStore, StoreError, UserStore};

// 定义全局状态
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub tokens: TokenService,
    pub passwords: Passwords,
}

/// 确保数据库中存在配置的默认管理员
async fn ensure_default_admin(state: &AppState, seed: &AdminSeed) {
    if let Err(e) = check_number(&seed.number).and_then(|_| check_password(&seed.password)) {
        tracing::error!("默认管理员配置无效，跳过创建: {}", e);
        return;
    }

    let password = match state.passwords.hash(&seed.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("无法生成管理员密码哈希: {}", e);
            return;
        }
    };

    let fields = UserFields {
        name: seed.name.clone(),
        number: seed.number.clone(),
        password,
        address: None,
        tag: None,
        role: Role::Admin,
    };

    match state.store.add_user(fields).await {
        Ok(user) => tracing::info!("默认管理员账号创建完毕: id={}", user.id),
        Err(StoreError::AlreadyExists) => tracing::info!("管理员账号已存在，跳过创建"),
        Err(e) => tracing::error!("默认管理员账号创建失败: {}", e),
    }
}

#[tokio::main]
async fn main() {
    // 1. 初始化环境变量与日志
    dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "用户管理服务启动中... 当前级别: {}",
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())
    );

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("配置加载失败: {}", e);
            std::process::exit(1);
        }
    };

    // 2. 初始化数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .expect("Failed to create database connection pool");

    let store = PgUserStore::new(pool);
    store.ensure_schema().await.expect("Failed to create users table");

    let shared_state = Arc::new(AppState {
        store: Arc::new(store),
        tokens: TokenService::new(&config.jwt_secret, config.token_issuer.clone()),
        passwords: Passwords::default(),
    });

    // 3. 执行启动预热逻辑
    if let Some(seed) = &config.admin {
        ensure_default_admin(&shared_state, seed).await;
    }

    // 4. 组合路由并启动
    let app = routes::app(shared_state);

    tracing::info!("🚀 Server deployed successfully at http://{}", config.server_addr);

    let listener = tokio::net::TcpListener::bind(config.server_addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app).await.expect("Server exited with error");
}
