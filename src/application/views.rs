use chrono::{DateTime, Utc};

use crate::domain::{Booking, Comment, CommentId, Item, ItemRequest, User};

/// 予約と、表示に必要な関連情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDetails {
    pub booking: Booking,
    pub item: Item,
    pub booker: User,
}

/// コメントと投稿者名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDetails {
    pub id: CommentId,
    pub text: String,
    pub author_name: String,
    pub created: DateTime<Utc>,
}

impl CommentDetails {
    pub fn new(comment: Comment, author_name: String) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            author_name,
            created: comment.created,
        }
    }
}

/// アイテム詳細
///
/// 直近・次回の予約は所有者が参照した場合のみ設定される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetails {
    pub item: Item,
    pub last_booking: Option<Booking>,
    pub next_booking: Option<Booking>,
    pub comments: Vec<CommentDetails>,
}

/// リクエストと作成者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDetails {
    pub request: ItemRequest,
    pub requestor: User,
}
