use crate::domain::{ItemRequest, NewItemRequest, Pagination, RequestId, UserId};
use crate::ports::{RequestRepository as RequestRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

fn map_row_to_request(row: &PgRow) -> ItemRequest {
    ItemRequest {
        id: RequestId::new(row.get("id")),
        description: row.get("description"),
        requestor_id: UserId::new(row.get("requestor_id")),
        created: row.get("created"),
    }
}

/// RequestRepositoryのPostgreSQL実装
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestRepositoryTrait for RequestRepository {
    async fn insert(&self, request: NewItemRequest) -> Result<ItemRequest> {
        let row = sqlx::query(
            r#"
            INSERT INTO item_requests (description, requestor_id, created)
            VALUES ($1, $2, $3)
            RETURNING id, description, requestor_id, created
            "#,
        )
        .bind(&request.description)
        .bind(request.requestor_id.value())
        .bind(request.created)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_row_to_request(&row))
    }

    async fn find_by_id(&self, request_id: RequestId) -> Result<Option<ItemRequest>> {
        let row = sqlx::query(
            r#"
            SELECT id, description, requestor_id, created
            FROM item_requests
            WHERE id = $1
            "#,
        )
        .bind(request_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_request))
    }

    async fn find_by_requestor(&self, requestor_id: UserId) -> Result<Vec<ItemRequest>> {
        let rows = sqlx::query(
            r#"
            SELECT id, description, requestor_id, created
            FROM item_requests
            WHERE requestor_id = $1
            ORDER BY created DESC, id DESC
            "#,
        )
        .bind(requestor_id.value())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_request).collect())
    }

    async fn find_by_other_requestors(
        &self,
        user_id: UserId,
        page: Pagination,
    ) -> Result<Vec<ItemRequest>> {
        let rows = sqlx::query(
            r#"
            SELECT id, description, requestor_id, created
            FROM item_requests
            WHERE requestor_id <> $1
            ORDER BY created DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id.value())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_request).collect())
    }
}
