use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CommentId, InvalidField, ItemId, UserId};

/// コメント本文の最大文字数
pub const MAX_COMMENT_LENGTH: usize = 1000;

/// コメント - 利用を終えた借り手によるアイテムへの感想
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    pub item_id: ItemId,
    pub author_id: UserId,
    pub created: DateTime<Utc>,
}

/// 登録前のコメント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub text: String,
    pub item_id: ItemId,
    pub author_id: UserId,
    pub created: DateTime<Utc>,
}

impl NewComment {
    pub fn new(
        item_id: ItemId,
        author_id: UserId,
        text: String,
        created: DateTime<Utc>,
    ) -> Result<Self, InvalidField> {
        if text.trim().is_empty() {
            return Err(InvalidField::new("text", "must not be blank"));
        }
        if text.chars().count() > MAX_COMMENT_LENGTH {
            return Err(InvalidField::new("text", "must be at most 1000 characters"));
        }
        Ok(Self {
            text,
            item_id,
            author_id,
            created,
        })
    }
}
