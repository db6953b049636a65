use crate::domain::{Item, ItemId, NewItem, Pagination, RequestId, UserId};
use crate::ports::{ItemRepository as ItemRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

fn map_row_to_item(row: &PgRow) -> Item {
    let request_id: Option<i64> = row.get("request_id");
    Item {
        id: ItemId::new(row.get("id")),
        name: row.get("name"),
        description: row.get("description"),
        available: row.get("available"),
        owner_id: UserId::new(row.get("owner_id")),
        request_id: request_id.map(RequestId::new),
    }
}

/// LIKEパターンの特殊文字をエスケープし、部分一致のパターンを作る
fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// ItemRepositoryのPostgreSQL実装
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRepositoryTrait for ItemRepository {
    async fn insert(&self, item: NewItem) -> Result<Item> {
        let row = sqlx::query(
            r#"
            INSERT INTO items (name, description, available, owner_id, request_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, available, owner_id, request_id
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.available)
        .bind(item.owner_id.value())
        .bind(item.request_id.map(|id| id.value()))
        .fetch_one(&self.pool)
        .await?;

        Ok(map_row_to_item(&row))
    }

    /// 行全体を1文で置き換える
    async fn update(&self, item: Item) -> Result<Option<Item>> {
        let row = sqlx::query(
            r#"
            UPDATE items
            SET name = $2, description = $3, available = $4, owner_id = $5, request_id = $6
            WHERE id = $1
            RETURNING id, name, description, available, owner_id, request_id
            "#,
        )
        .bind(item.id.value())
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.available)
        .bind(item.owner_id.value())
        .bind(item.request_id.map(|id| id.value()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_item))
    }

    async fn find_by_id(&self, item_id: ItemId) -> Result<Option<Item>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, available, owner_id, request_id
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(item_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_item))
    }

    async fn find_by_ids(&self, item_ids: &[ItemId]) -> Result<Vec<Item>> {
        let ids: Vec<i64> = item_ids.iter().map(|id| id.value()).collect();
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, available, owner_id, request_id
            FROM items
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_item).collect())
    }

    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Item>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, available, owner_id, request_id
            FROM items
            WHERE owner_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner_id.value())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_item).collect())
    }

    async fn search(&self, needle: &str, page: Pagination) -> Result<Vec<Item>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, available, owner_id, request_id
            FROM items
            WHERE available
              AND (LOWER(name) LIKE $1 ESCAPE '\' OR LOWER(description) LIKE $1 ESCAPE '\')
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(contains_pattern(needle))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_item).collect())
    }

    async fn find_by_requests(
        &self,
        request_ids: &[RequestId],
        exclude_owner: Option<UserId>,
    ) -> Result<Vec<Item>> {
        let ids: Vec<i64> = request_ids.iter().map(|id| id.value()).collect();
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, available, owner_id, request_id
            FROM items
            WHERE request_id = ANY($1)
              AND ($2::BIGINT IS NULL OR owner_id <> $2)
            ORDER BY id
            "#,
        )
        .bind(ids)
        .bind(exclude_owner.map(|id| id.value()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_item).collect())
    }
}
