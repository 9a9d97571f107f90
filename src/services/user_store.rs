use async_trait::async_trait;
use sqlx::{postgres::PgPool, Postgres, QueryBuilder};

use crate::models::user::{PageQuery, User, UserFields, UserPage};

const USER_COLUMNS: &str = "id, name, number, password, address, tag, role";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("用户不存在")]
    NotFound,
    #[error("手机号或者用户名已存在")]
    AlreadyExists,
    #[error("数据库异常: {0}")]
    Database(#[from] sqlx::Error),
}

/// users 表上的全部操作。除单条语句的原子性外不提供事务保证
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 按用户名 + 手机号精确匹配，不校验密码
    async fn login(&self, name: &str, number: &str) -> Result<User, StoreError>;

    /// 用户名或手机号任一已存在则返回 AlreadyExists
    async fn add_user(&self, fields: UserFields) -> Result<User, StoreError>;

    async fn get_user_by_id(&self, id: i32) -> Result<User, StoreError>;

    /// total 在取页之后单独计数，两次查询之间的并发写入可能导致二者不一致
    async fn get_user_page(&self, query: &PageQuery) -> Result<UserPage, StoreError>;

    /// 幂等删除：没有匹配行也视为成功
    async fn delete_user(&self, id: i32) -> Result<(), StoreError>;

    /// 整行覆盖 name/password/number/address/tag/role。
    /// 部分更新的字段合并由调用方完成
    async fn update_user(&self, id: i32, fields: UserFields) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 建表（等价于启动时自动迁移）
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id SERIAL PRIMARY KEY,
                name VARCHAR(32) NOT NULL UNIQUE,
                number VARCHAR(11) NOT NULL UNIQUE,
                password VARCHAR(255) NOT NULL,
                address VARCHAR(256),
                tag VARCHAR(5),
                role VARCHAR(2) NOT NULL DEFAULT '1'
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// 将唯一约束冲突映射为 AlreadyExists
fn map_unique(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::AlreadyExists,
        _ => StoreError::Database(e),
    }
}

/// LIKE 子串匹配：转义通配符，按字面量匹配
pub fn like_pattern(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len() + 2);
    escaped.push('%');
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &PageQuery) {
    let mut sep = " WHERE ";

    if let Some(name) = query.name.as_deref() {
        builder.push(sep).push("name LIKE ").push_bind(like_pattern(name));
        sep = " AND ";
    }
    if let Some(number) = query.number.as_deref() {
        builder.push(sep).push("number LIKE ").push_bind(like_pattern(number));
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn login(&self, name: &str, number: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE number = $1 AND name = $2"
        ))
        .bind(number)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn add_user(&self, fields: UserFields) -> Result<User, StoreError> {
        let existing: Option<i32> =
            sqlx::query_scalar("SELECT id FROM users WHERE number = $1 OR name = $2 LIMIT 1")
                .bind(&fields.number)
                .bind(&fields.name)
                .fetch_optional(&self.pool)
                .await?;
        if existing.is_some() {
            return Err(StoreError::AlreadyExists);
        }

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, number, password, address, tag, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&fields.name)
        .bind(&fields.number)
        .bind(&fields.password)
        .bind(&fields.address)
        .bind(&fields.tag)
        .bind(fields.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique)?;

        tracing::info!("新增用户: id={}, name={}", user.id, user.name);
        Ok(user)
    }

    async fn get_user_by_id(&self, id: i32) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn get_user_page(&self, query: &PageQuery) -> Result<UserPage, StoreError> {
        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_filters(&mut select, query);
        select.push(" ORDER BY id LIMIT ");
        select.push_bind(query.page_size);
        select.push(" OFFSET ");
        select.push_bind(query.offset());

        let items = select.build_query_as::<User>().fetch_all(&self.pool).await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT count(*) FROM users");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        Ok(UserPage { items, total })
    }

    async fn delete_user(&self, id: i32) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::info!("删除用户: id={}, 影响行数={}", id, res.rows_affected());
        Ok(())
    }

    async fn update_user(&self, id: i32, fields: UserFields) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = $1, password = $2, number = $3, address = $4, tag = $5, role = $6
            WHERE id = $7
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.password)
        .bind(&fields.number)
        .bind(&fields.address)
        .bind(&fields.tag)
        .bind(fields.role.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_unique)?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
