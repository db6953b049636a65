use crate::domain::{Comment, CommentId, ItemId, NewComment, UserId};
use crate::ports::{CommentRepository as CommentRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

fn map_row_to_comment(row: &PgRow) -> Comment {
    Comment {
        id: CommentId::new(row.get("id")),
        text: row.get("text"),
        item_id: ItemId::new(row.get("item_id")),
        author_id: UserId::new(row.get("author_id")),
        created: row.get("created"),
    }
}

/// CommentRepositoryのPostgreSQL実装
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepositoryTrait for CommentRepository {
    async fn insert(&self, comment: NewComment) -> Result<Comment> {
        let row = sqlx::query(
            r#"
            INSERT INTO comments (text, item_id, author_id, created)
            VALUES ($1, $2, $3, $4)
            RETURNING id, text, item_id, author_id, created
            "#,
        )
        .bind(&comment.text)
        .bind(comment.item_id.value())
        .bind(comment.author_id.value())
        .bind(comment.created)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_row_to_comment(&row))
    }

    async fn find_by_items(&self, item_ids: &[ItemId]) -> Result<Vec<Comment>> {
        let ids: Vec<i64> = item_ids.iter().map(|id| id.value()).collect();
        let rows = sqlx::query(
            r#"
            SELECT id, text, item_id, author_id, created
            FROM comments
            WHERE item_id = ANY($1)
            ORDER BY created, id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_comment).collect())
    }
}
