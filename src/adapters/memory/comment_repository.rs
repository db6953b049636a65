use async_trait::async_trait;

use crate::domain::{Comment, CommentId, ItemId, NewComment};
use crate::ports::{CommentRepository, Result};

use super::store::InMemoryStore;

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn insert(&self, comment: NewComment) -> Result<Comment> {
        let mut tables = self.lock()?;
        Ok(tables.comments.insert_with(|id| Comment {
            id: CommentId::new(id),
            text: comment.text,
            item_id: comment.item_id,
            author_id: comment.author_id,
            created: comment.created,
        }))
    }

    async fn find_by_items(&self, item_ids: &[ItemId]) -> Result<Vec<Comment>> {
        let tables = self.lock()?;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| item_ids.contains(&c.item_id))
            .cloned()
            .collect();
        comments.sort_by_key(|c| (c.created, c.id));
        Ok(comments)
    }
}
