use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookingId, ItemId, RequestId, UserId};

/// コマンド：ユーザーを登録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

/// コマンド：ユーザーを部分更新する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUser {
    pub user_id: UserId,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// コマンド：アイテムを登録する
///
/// `description`と`available`は必須。Noneのまま渡された場合は検証エラー。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateItem {
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub available: Option<bool>,
    pub request_id: Option<RequestId>,
}

/// コマンド：アイテムを部分更新する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateItem {
    pub item_id: ItemId,
    pub user_id: UserId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

/// コマンド：予約を申し込む
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBooking {
    pub booker_id: UserId,
    pub item_id: ItemId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：予約を承認・却下する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecideBooking {
    pub booking_id: BookingId,
    pub owner_id: UserId,
    pub approved: bool,
}

/// コマンド：コメントを投稿する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddComment {
    pub item_id: ItemId,
    pub author_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// コマンド：アイテムリクエストを作成する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequest {
    pub requestor_id: UserId,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
