use crate::domain::{Item, ItemId, ItemRequest, RequestId, User, UserId};
use crate::ports::*;
use std::sync::Arc;

use super::errors::{ApplicationError, Result};

/// サービスの依存関係
///
/// データ構造として定義し、振る舞いは持たない。
/// 各ユースケース関数はこの構造体を引数で受け取る。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub users: Arc<dyn UserRepository>,
    pub items: Arc<dyn ItemRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub requests: Arc<dyn RequestRepository>,
}

/// ユーザーを取得する（存在しなければNotFound）
pub(super) async fn require_user(deps: &ServiceDependencies, user_id: UserId) -> Result<User> {
    deps.users
        .find_by_id(user_id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or_else(|| ApplicationError::not_found("User", user_id))
}

/// アイテムを取得する（存在しなければNotFound）
pub(super) async fn require_item(deps: &ServiceDependencies, item_id: ItemId) -> Result<Item> {
    deps.items
        .find_by_id(item_id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or_else(|| ApplicationError::not_found("Item", item_id))
}

/// リクエストを取得する（存在しなければNotFound）
pub(super) async fn require_request(
    deps: &ServiceDependencies,
    request_id: RequestId,
) -> Result<ItemRequest> {
    deps.requests
        .find_by_id(request_id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or_else(|| ApplicationError::not_found("Request", request_id))
}
