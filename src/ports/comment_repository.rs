use crate::domain::{Comment, ItemId, NewComment};
use async_trait::async_trait;

use super::Result;

/// コメントリポジトリポート
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: NewComment) -> Result<Comment>;

    /// 指定アイテムへのコメントを作成日時順で取得する
    async fn find_by_items(&self, item_ids: &[ItemId]) -> Result<Vec<Comment>>;
}
