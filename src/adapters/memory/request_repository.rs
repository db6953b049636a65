use async_trait::async_trait;
use std::cmp::Reverse;

use crate::domain::{ItemRequest, NewItemRequest, Pagination, RequestId, UserId};
use crate::ports::{RequestRepository, Result};

use super::store::InMemoryStore;

fn newest_first(requests: &mut [ItemRequest]) {
    requests.sort_by_key(|r| Reverse((r.created, r.id)));
}

#[async_trait]
impl RequestRepository for InMemoryStore {
    async fn insert(&self, request: NewItemRequest) -> Result<ItemRequest> {
        let mut tables = self.lock()?;
        Ok(tables.requests.insert_with(|id| ItemRequest {
            id: RequestId::new(id),
            description: request.description,
            requestor_id: request.requestor_id,
            created: request.created,
        }))
    }

    async fn find_by_id(&self, request_id: RequestId) -> Result<Option<ItemRequest>> {
        Ok(self.lock()?.requests.get(request_id.value()).cloned())
    }

    async fn find_by_requestor(&self, requestor_id: UserId) -> Result<Vec<ItemRequest>> {
        let tables = self.lock()?;
        let mut requests: Vec<ItemRequest> = tables
            .requests
            .values()
            .filter(|r| r.requestor_id == requestor_id)
            .cloned()
            .collect();
        newest_first(&mut requests);
        Ok(requests)
    }

    async fn find_by_other_requestors(
        &self,
        user_id: UserId,
        page: Pagination,
    ) -> Result<Vec<ItemRequest>> {
        let tables = self.lock()?;
        let mut requests: Vec<ItemRequest> = tables
            .requests
            .values()
            .filter(|r| r.requestor_id != user_id)
            .cloned()
            .collect();
        newest_first(&mut requests);

        let (offset, limit) = page.window();
        Ok(requests.into_iter().skip(offset).take(limit).collect())
    }
}
