use thiserror::Error;

use crate::domain::{
    BookingStatus, CreateBookingError, DecideBookingError, InvalidField, InvalidPagination,
    UpdateItemError,
};

/// アプリケーション層のエラー
///
/// 失敗の種類ごとに1つのバリアントを持つ。HTTPステータスへの対応付けはAPI層で行う。
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 入力値が不正
    #[error("{0}")]
    Validation(String),

    /// 対象が存在しない
    #[error("{0}")]
    NotFound(String),

    /// 所有者が自分のアイテムを予約しようとした
    #[error("Owner cannot book own item")]
    BookerIsOwner,

    /// 貸出不可のアイテム
    #[error("Item is not available for booking")]
    UnavailableItem,

    /// アイテム所有者以外による承認・却下
    #[error("Only the item owner can approve or reject a booking")]
    CannotApprove,

    /// 現在と同じステータスへの変更
    #[error("Booking already has status {0}")]
    SameApproveStatus(BookingStatus),

    /// 承認・却下済みの予約を反対の結果に変更しようとした
    #[error("Booking is already {0} and cannot be changed")]
    AlreadyDecided(BookingStatus),

    /// 予約者・所有者以外による参照
    #[error("User has no access to booking")]
    NoAccessToBook,

    /// 承認済みかつ終了済みの予約がない
    #[error("User cannot comment on item without a completed booking")]
    CannotComment,

    /// メールアドレスが他のユーザーに使用されている
    #[error("Email is already used by another user")]
    DuplicateEmail,

    /// アイテム所有者以外による更新
    #[error("User is not the owner of the item")]
    NotOwner,

    /// リポジトリのエラー
    #[error("Repository error")]
    Repository(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApplicationError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        ApplicationError::NotFound(format!("{} with id {} not found", entity, id))
    }
}

impl From<InvalidField> for ApplicationError {
    fn from(e: InvalidField) -> Self {
        ApplicationError::Validation(e.to_string())
    }
}

impl From<InvalidPagination> for ApplicationError {
    fn from(e: InvalidPagination) -> Self {
        ApplicationError::Validation(format!(
            "Invalid pagination: from={} must be >= 0 and size={} must be > 0",
            e.from, e.size
        ))
    }
}

impl From<CreateBookingError> for ApplicationError {
    fn from(e: CreateBookingError) -> Self {
        match e {
            CreateBookingError::InvalidPeriod => ApplicationError::Validation(
                "Booking start must be before end and neither may be in the past".to_string(),
            ),
            CreateBookingError::BookerIsOwner => ApplicationError::BookerIsOwner,
            CreateBookingError::UnavailableItem => ApplicationError::UnavailableItem,
        }
    }
}

impl From<DecideBookingError> for ApplicationError {
    fn from(e: DecideBookingError) -> Self {
        match e {
            DecideBookingError::CannotApprove => ApplicationError::CannotApprove,
            DecideBookingError::SameStatus(status) => ApplicationError::SameApproveStatus(status),
            DecideBookingError::AlreadyDecided(status) => ApplicationError::AlreadyDecided(status),
        }
    }
}

impl From<UpdateItemError> for ApplicationError {
    fn from(e: UpdateItemError) -> Self {
        match e {
            UpdateItemError::NotOwner => ApplicationError::NotOwner,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, ApplicationError>;
