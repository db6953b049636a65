use crate::domain::{ItemRequest, NewItemRequest, Pagination, RequestId, UserId};
use async_trait::async_trait;

use super::Result;

/// アイテムリクエストリポジトリポート
///
/// 一覧系はすべて作成日時の降順（同時刻はIDの降順）で返す。
#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn insert(&self, request: NewItemRequest) -> Result<ItemRequest>;

    async fn find_by_id(&self, request_id: RequestId) -> Result<Option<ItemRequest>>;

    /// ユーザー自身のリクエスト
    async fn find_by_requestor(&self, requestor_id: UserId) -> Result<Vec<ItemRequest>>;

    /// ユーザー以外のリクエスト
    async fn find_by_other_requestors(
        &self,
        user_id: UserId,
        page: Pagination,
    ) -> Result<Vec<ItemRequest>>;
}
