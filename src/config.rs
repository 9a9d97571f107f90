use std::env;
use std::net::SocketAddr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("环境变量 {0} 未设置")]
    Missing(&'static str),
    #[error("环境变量 {name} 的值无效: {value}")]
    Invalid { name: &'static str, value: String },
}

/// 启动时创建的默认管理员账号
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub number: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub token_issuer: String,
    pub server_addr: SocketAddr,
    pub db_max_connections: u32,
    pub admin: Option<AdminSeed>,
}

pub const DEFAULT_ISSUER: &str = "user-admin-backend";

impl Config {
    /// 从环境变量读取配置，调用前应先执行 dotenvy::dotenv()
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let server_addr = match lookup("SERVER_ADDR") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "SERVER_ADDR", value })?,
            None => SocketAddr::from(([0, 0, 0, 0], 3000)),
        };

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "DB_MAX_CONNECTIONS", value })?,
            None => 20,
        };

        let admin = match (lookup("ADMIN_NAME"), lookup("ADMIN_NUMBER"), lookup("ADMIN_PASSWORD")) {
            (Some(name), Some(number), Some(password)) => Some(AdminSeed { name, number, password }),
            _ => None,
        };

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            token_issuer: lookup("TOKEN_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
            server_addr,
            db_max_connections,
            admin,
        })
    }
}
