use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{BookingDetails, CommentDetails, ItemDetails, RequestDetails};
use crate::domain::{Booking, BookingStatus, Item, RequestAnswer, User};

// ============================================================================
// Users
// ============================================================================

/// ユーザー登録リクエスト（POST /users）
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

/// ユーザー更新リクエスト（PATCH /users/:id）
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.value(),
            name: user.name,
            email: user.email,
        }
    }
}

/// 他のレスポンスに埋め込むユーザー
#[derive(Debug, Serialize, Deserialize)]
pub struct UserShortResponse {
    pub id: i64,
    pub name: String,
}

impl From<User> for UserShortResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.value(),
            name: user.name,
        }
    }
}

// ============================================================================
// Items
// ============================================================================

/// アイテム登録リクエスト（POST /items）
///
/// `description`と`available`の欠落はアプリケーション層で検証エラーにする。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub name: String,
    pub description: Option<String>,
    pub available: Option<bool>,
    pub request_id: Option<i64>,
}

/// アイテム更新リクエスト（PATCH /items/:id）
#[derive(Debug, Default, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

/// 検索のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_from")]
    pub from: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<i64>,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id.value(),
            name: item.name,
            description: item.description,
            available: item.available,
            request_id: item.request_id.map(|id| id.value()),
        }
    }
}

/// 他のレスポンスに埋め込むアイテム
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemShortResponse {
    pub id: i64,
    pub name: String,
}

impl From<Item> for ItemShortResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id.value(),
            name: item.name,
        }
    }
}

/// アイテム詳細に表示する予約枠
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSlotResponse {
    pub id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub booker_id: i64,
}

impl From<Booking> for BookingSlotResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id.value(),
            start: booking.start,
            end: booking.end,
            booker_id: booking.booker_id.value(),
        }
    }
}

/// アイテム詳細（GET /items/:id, GET /items）
///
/// 直近・次回の予約は所有者が参照した場合のみ出力される。
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetailsResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_booking: Option<BookingSlotResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_booking: Option<BookingSlotResponse>,
    pub comments: Vec<CommentResponse>,
}

impl From<ItemDetails> for ItemDetailsResponse {
    fn from(details: ItemDetails) -> Self {
        Self {
            id: details.item.id.value(),
            name: details.item.name,
            description: details.item.description,
            available: details.item.available,
            request_id: details.item.request_id.map(|id| id.value()),
            last_booking: details.last_booking.map(BookingSlotResponse::from),
            next_booking: details.next_booking.map(BookingSlotResponse::from),
            comments: details
                .comments
                .into_iter()
                .map(CommentResponse::from)
                .collect(),
        }
    }
}

// ============================================================================
// Comments
// ============================================================================

/// コメント投稿リクエスト（POST /items/:id/comment）
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i64,
    pub text: String,
    pub author_name: String,
    pub created: DateTime<Utc>,
}

impl From<CommentDetails> for CommentResponse {
    fn from(comment: CommentDetails) -> Self {
        Self {
            id: comment.id.value(),
            text: comment.text,
            author_name: comment.author_name,
            created: comment.created,
        }
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// 予約申込リクエスト（POST /bookings）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub item_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// 承認・却下のクエリパラメータ（PATCH /bookings/:id?approved=）
#[derive(Debug, Deserialize)]
pub struct ApprovalQuery {
    pub approved: bool,
}

/// 予約一覧のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default = "default_from")]
    pub from: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

fn default_state() -> String {
    "ALL".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    pub id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub item: ItemShortResponse,
    pub booker: UserShortResponse,
    pub status: BookingStatus,
}

impl From<BookingDetails> for BookingResponse {
    fn from(details: BookingDetails) -> Self {
        Self {
            id: details.booking.id.value(),
            start: details.booking.start,
            end: details.booking.end,
            item: details.item.into(),
            booker: details.booker.into(),
            status: details.booking.status,
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// リクエスト作成（POST /requests）
#[derive(Debug, Deserialize)]
pub struct CreateItemRequestRequest {
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RequestResponse {
    pub id: i64,
    pub description: String,
    pub requestor: UserShortResponse,
    pub created: DateTime<Utc>,
}

impl From<RequestDetails> for RequestResponse {
    fn from(details: RequestDetails) -> Self {
        Self {
            id: details.request.id.value(),
            description: details.request.description,
            requestor: details.requestor.into(),
            created: details.request.created,
        }
    }
}

/// リクエストと回答アイテム
#[derive(Debug, Serialize, Deserialize)]
pub struct RequestAnswerResponse {
    pub id: i64,
    pub description: String,
    pub created: DateTime<Utc>,
    pub items: Vec<ItemResponse>,
}

impl From<RequestAnswer> for RequestAnswerResponse {
    fn from(answer: RequestAnswer) -> Self {
        Self {
            id: answer.request.id.value(),
            description: answer.request.description,
            created: answer.request.created,
            items: answer.items.into_iter().map(ItemResponse::from).collect(),
        }
    }
}

// ============================================================================
// Common
// ============================================================================

/// ページングのクエリパラメータ（省略時 from=0, size=2000）
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_from")]
    pub from: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

fn default_from() -> i64 {
    crate::domain::Pagination::DEFAULT_FROM
}

fn default_size() -> i64 {
    crate::domain::Pagination::DEFAULT_SIZE
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
