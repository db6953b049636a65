use async_trait::async_trait;

use crate::domain::{self, Item, ItemId, NewItem, Pagination, RequestId, UserId};
use crate::ports::{ItemRepository, Result};

use super::store::InMemoryStore;

#[async_trait]
impl ItemRepository for InMemoryStore {
    async fn insert(&self, item: NewItem) -> Result<Item> {
        let mut tables = self.lock()?;
        Ok(tables.items.insert_with(|id| Item {
            id: ItemId::new(id),
            name: item.name,
            description: item.description,
            available: item.available,
            owner_id: item.owner_id,
            request_id: item.request_id,
        }))
    }

    async fn update(&self, item: Item) -> Result<Option<Item>> {
        let mut tables = self.lock()?;
        match tables.items.get_mut(item.id.value()) {
            Some(row) => {
                *row = item.clone();
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, item_id: ItemId) -> Result<Option<Item>> {
        Ok(self.lock()?.items.get(item_id.value()).cloned())
    }

    async fn find_by_ids(&self, item_ids: &[ItemId]) -> Result<Vec<Item>> {
        let tables = self.lock()?;
        Ok(tables
            .items
            .values()
            .filter(|i| item_ids.contains(&i.id))
            .cloned()
            .collect())
    }

    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Item>> {
        let tables = self.lock()?;
        Ok(tables
            .items
            .values()
            .filter(|i| i.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn search(&self, needle: &str, page: Pagination) -> Result<Vec<Item>> {
        let (offset, limit) = page.window();
        let tables = self.lock()?;
        Ok(tables
            .items
            .values()
            .filter(|i| domain::item::matches_search(i, needle))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_by_requests(
        &self,
        request_ids: &[RequestId],
        exclude_owner: Option<UserId>,
    ) -> Result<Vec<Item>> {
        let tables = self.lock()?;
        Ok(tables
            .items
            .values()
            .filter(|i| i.request_id.is_some_and(|id| request_ids.contains(&id)))
            .filter(|i| Some(i.owner_id) != exclude_owner)
            .cloned()
            .collect())
    }
}
