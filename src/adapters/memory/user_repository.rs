use async_trait::async_trait;

use crate::domain::{NewUser, User, UserId};
use crate::ports::{EmailAlreadyUsed, Result, UserRepository};

use super::store::{InMemoryStore, Tables};

fn email_taken(tables: &Tables, email: &str, except: Option<UserId>) -> bool {
    tables
        .users
        .values()
        .any(|u| u.email == email && Some(u.id) != except)
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: NewUser) -> Result<User> {
        let mut tables = self.lock()?;
        if email_taken(&tables, &user.email, None) {
            return Err(Box::new(EmailAlreadyUsed(user.email)));
        }

        Ok(tables.users.insert_with(|id| User {
            id: UserId::new(id),
            name: user.name,
            email: user.email,
        }))
    }

    async fn update(&self, user: User) -> Result<Option<User>> {
        let mut tables = self.lock()?;
        if email_taken(&tables, &user.email, Some(user.id)) {
            return Err(Box::new(EmailAlreadyUsed(user.email)));
        }

        match tables.users.get_mut(user.id.value()) {
            Some(row) => {
                *row = user.clone();
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// 外部キーのON DELETE CASCADE / SET NULLと同じ結果になるよう関連行を整理する
    async fn delete(&self, user_id: UserId) -> Result<bool> {
        let mut tables = self.lock()?;
        if tables.users.remove(user_id.value()).is_none() {
            return Ok(false);
        }

        let owned_items: Vec<_> = tables
            .items
            .values()
            .filter(|i| i.owner_id == user_id)
            .map(|i| i.id)
            .collect();
        let own_requests: Vec<_> = tables
            .requests
            .values()
            .filter(|r| r.requestor_id == user_id)
            .map(|r| r.id)
            .collect();

        tables.items.retain(|i| i.owner_id != user_id);
        for item in tables.items.values_mut() {
            if item.request_id.is_some_and(|id| own_requests.contains(&id)) {
                item.request_id = None;
            }
        }
        tables.requests.retain(|r| r.requestor_id != user_id);
        tables
            .bookings
            .retain(|b| b.booker_id != user_id && !owned_items.contains(&b.item_id));
        tables
            .comments
            .retain(|c| c.author_id != user_id && !owned_items.contains(&c.item_id));

        Ok(true)
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>> {
        Ok(self.lock()?.users.get(user_id.value()).cloned())
    }

    async fn find_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<User>> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .values()
            .filter(|u| user_ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.lock()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        Ok(self.lock()?.users.values().cloned().collect())
    }
}
