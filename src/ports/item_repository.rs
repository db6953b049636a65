use crate::domain::{Item, ItemId, NewItem, Pagination, RequestId, UserId};
use async_trait::async_trait;

use super::Result;

/// アイテムリポジトリポート
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn insert(&self, item: NewItem) -> Result<Item>;

    /// アイテムの行全体を置き換える
    ///
    /// 該当IDが存在しない場合はNone。
    async fn update(&self, item: Item) -> Result<Option<Item>>;

    async fn find_by_id(&self, item_id: ItemId) -> Result<Option<Item>>;

    async fn find_by_ids(&self, item_ids: &[ItemId]) -> Result<Vec<Item>>;

    /// 所有者のアイテムをID順で取得する
    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Item>>;

    /// 貸出可能なアイテムを名前・説明の部分一致で検索する
    ///
    /// `needle`は小文字化済み。大文字・小文字は区別しない。ID順。
    async fn search(&self, needle: &str, page: Pagination) -> Result<Vec<Item>>;

    /// 指定リクエストに応えたアイテムを取得する
    ///
    /// `exclude_owner`が指定された場合、そのユーザーが所有するアイテムは除く。
    async fn find_by_requests(
        &self,
        request_ids: &[RequestId],
        exclude_owner: Option<UserId>,
    ) -> Result<Vec<Item>>;
}
