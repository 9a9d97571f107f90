//! 测试用的内存版 UserStore，语义与 PgUserStore 保持一致

use async_trait::async_trait;
use std::sync::Mutex;

use crate::models::user::{PageQuery, User, UserFields, UserPage};
use crate::services::user_store::{StoreError, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i32,
    rows: Vec<User>,
}

impl MemoryUserStore {
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn matches(user: &User, query: &PageQuery) -> bool {
    query.name.as_deref().map_or(true, |n| user.name.contains(n))
        && query.number.as_deref().map_or(true, |n| user.number.contains(n))
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn login(&self, name: &str, number: &str) -> Result<User, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner
            .rows
            .iter()
            .find(|u| u.name == name && u.number == number)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn add_user(&self, fields: UserFields) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .rows
            .iter()
            .any(|u| u.name == fields.name || u.number == fields.number)
        {
            return Err(StoreError::AlreadyExists);
        }
        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            name: fields.name,
            number: fields.number,
            password: fields.password,
            address: fields.address,
            tag: fields.tag,
            role: fields.role,
        };
        inner.rows.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: i32) -> Result<User, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner
            .rows
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_user_page(&self, query: &PageQuery) -> Result<UserPage, StoreError> {
        let inner = self.inner.lock().unwrap();
        let matching: Vec<&User> = inner.rows.iter().filter(|u| matches(u, query)).collect();
        let items = matching
            .iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(query.page_size).unwrap_or(0))
            .map(|u| (*u).clone())
            .collect();
        Ok(UserPage { items, total: matching.len() as i64 })
    }

    async fn delete_user(&self, id: i32) -> Result<(), StoreError> {
        self.inner.lock().unwrap().rows.retain(|u| u.id != id);
        Ok(())
    }

    async fn update_user(&self, id: i32, fields: UserFields) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .rows
            .iter()
            .any(|u| u.id != id && (u.name == fields.name || u.number == fields.number))
        {
            return Err(StoreError::AlreadyExists);
        }
        if let Some(user) = inner.rows.iter_mut().find(|u| u.id == id) {
            user.name = fields.name;
            user.number = fields.number;
            user.password = fields.password;
            user.address = fields.address;
            user.tag = fields.tag;
            user.role = fields.role;
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
