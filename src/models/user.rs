use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use std::fmt;
use std::str::FromStr;

/// 用户角色：数据库与接口中均以字符串 "0"/"1"/"2" 表示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    Admin,
    #[default]
    Normal,
    Banned,
}

#[derive(Debug, thiserror::Error)]
#[error("未知的用户角色: {0}")]
pub struct RoleParseError(pub String);

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "0",
            Role::Normal => "1",
            Role::Banned => "2",
        }
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Role::Admin),
            "1" => Ok(Role::Normal),
            "2" => Ok(Role::Banned),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// users 表中的一行。password 为 argon2 PHC 字符串
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub number: String,
    pub password: String,
    pub address: Option<String>,
    pub tag: Option<String>,
    pub role: Role,
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let role: String = row.try_get("role")?;
        let role: Role = role.parse().map_err(|e: RoleParseError| sqlx::Error::ColumnDecode {
            index: "role".to_string(),
            source: Box::new(e),
        })?;

        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            number: row.try_get("number")?,
            password: row.try_get("password")?,
            address: row.try_get("address")?,
            tag: row.try_get("tag")?,
            role,
        })
    }
}

/// 写入数据库的完整字段集合，新增与整行覆盖更新共用
#[derive(Debug, Clone, PartialEq)]
pub struct UserFields {
    pub name: String,
    pub number: String,
    pub password: String,
    pub address: Option<String>,
    pub tag: Option<String>,
    pub role: Role,
}

impl From<&User> for UserFields {
    fn from(user: &User) -> Self {
        UserFields {
            name: user.name.clone(),
            number: user.number.clone(),
            password: user.password.clone(),
            address: user.address.clone(),
            tag: user.tag.clone(),
            role: user.role,
        }
    }
}

/// 对外返回的用户信息，不包含密码
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: i32,
    pub name: String,
    pub number: String,
    pub address: Option<String>,
    pub tag: Option<String>,
    pub role: Role,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            id: user.id,
            name: user.name.clone(),
            number: user.number.clone(),
            address: user.address.clone(),
            tag: user.tag.clone(),
            role: user.role,
        }
    }
}

/// 分页查询条件，空字符串视为未提供
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    pub page_num: i64,
    pub page_size: i64,
    pub name: Option<String>,
    pub number: Option<String>,
}

impl PageQuery {
    /// 超大页码饱和到 i64::MAX，结果为空页而不是溢出
    pub fn offset(&self) -> i64 {
        (self.page_num - 1).max(0).saturating_mul(self.page_size)
    }
}

#[derive(Debug, Clone)]
pub struct UserPage {
    pub items: Vec<User>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub user_name: String,
    pub user_number: String,
    pub iss: String,
    pub sub: String,
    pub iat: i64, // 签发时间
    pub exp: i64, // 过期时间
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_its_code() {
        for role in [Role::Admin, Role::Normal, Role::Banned] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("3".parse::<Role>().is_err());
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_as_string_code() {
        assert_eq!(serde_json::to_string(&Role::Banned).unwrap(), "\"2\"");
        let role: Role = serde_json::from_str("\"0\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert!(serde_json::from_str::<Role>("\"9\"").is_err());
    }

    #[test]
    fn page_offset_starts_at_zero() {
        let query = PageQuery { page_num: 2, page_size: 3, ..Default::default() };
        assert_eq!(query.offset(), 3);
    }

    #[test]
    fn huge_page_offset_saturates() {
        let query = PageQuery { page_num: i64::MAX, page_size: 3, ..Default::default() };
        assert_eq!(query.offset(), i64::MAX);
    }
}
