use super::BookingStatus;

/// 入力値のエラー
///
/// どの項目がなぜ不正かを保持する。メッセージ化はアプリケーション層で行う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidField {
    pub field: &'static str,
    pub reason: &'static str,
}

impl InvalidField {
    pub fn new(field: &'static str, reason: &'static str) -> Self {
        Self { field, reason }
    }
}

impl std::fmt::Display for InvalidField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// ページング指定のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPagination {
    pub from: i64,
    pub size: i64,
}

/// 予約作成のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateBookingError {
    /// 予約期間が不正（開始 >= 終了、または過去）
    InvalidPeriod,
    /// 所有者自身による予約
    BookerIsOwner,
    /// 貸出不可のアイテム
    UnavailableItem,
}

/// 予約の承認・却下のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecideBookingError {
    /// アイテムの所有者ではない
    CannotApprove,
    /// 現在と同じステータスへの変更
    SameStatus(BookingStatus),
    /// 既に承認・却下済み（終端状態からは遷移しない）
    AlreadyDecided(BookingStatus),
}

/// アイテム更新のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateItemError {
    /// 所有者ではない
    NotOwner,
}
