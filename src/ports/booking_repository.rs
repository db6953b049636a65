use crate::domain::{
    Booking, BookingFilter, BookingId, BookingStatus, ItemId, NewBooking, Pagination, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::Result;

/// 予約リポジトリポート
///
/// 一覧系はすべて開始日時の降順（同時刻はIDの降順）で返す。
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: NewBooking) -> Result<Booking>;

    /// ステータスを条件付きで更新する
    ///
    /// 現在のステータスが`expected`の場合のみ`status`に変更する。
    /// 条件に一致しなかった（他の更新が先行した）場合はNone。
    async fn update_status(
        &self,
        booking_id: BookingId,
        expected: BookingStatus,
        status: BookingStatus,
    ) -> Result<Option<Booking>>;

    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>>;

    /// 予約者の予約を条件で絞り込んで取得する
    async fn find_by_booker(
        &self,
        booker_id: UserId,
        filter: BookingFilter,
        now: DateTime<Utc>,
        page: Pagination,
    ) -> Result<Vec<Booking>>;

    /// 指定アイテムへの予約を条件で絞り込んで取得する
    async fn find_by_items(
        &self,
        item_ids: &[ItemId],
        filter: BookingFilter,
        now: DateTime<Utc>,
        page: Pagination,
    ) -> Result<Vec<Booking>>;

    /// アイテムごとの直近の予約（1アイテム最大1件）
    async fn find_last_for_items(
        &self,
        item_ids: &[ItemId],
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>>;

    /// アイテムごとの次回の予約（1アイテム最大1件）
    async fn find_next_for_items(
        &self,
        item_ids: &[ItemId],
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>>;

    /// 予約者によるアイテムの、承認済みかつ終了済みの予約
    ///
    /// コメント投稿の資格確認に使用される。
    async fn find_completed_approved(
        &self,
        booker_id: UserId,
        item_id: ItemId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>>;
}
