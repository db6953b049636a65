use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{BookingId, CreateBookingError, DecideBookingError, Item, ItemId, UserId};

// ============================================================================
// ステータスとフィルタ
// ============================================================================

/// 予約ステータス（永続化される状態）
///
/// 状態遷移：WAITING → APPROVED | REJECTED
/// APPROVED, REJECTEDは終端状態。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// 所有者の判断待ち
    Waiting,
    /// 承認済み
    Approved,
    /// 却下済み
    Rejected,
}

impl BookingStatus {
    /// 文字列表現を取得する（DBの`status`列と同じ値）
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
        }
    }

    pub fn is_decided(&self) -> bool {
        !matches!(self, BookingStatus::Waiting)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(BookingStatus::Waiting),
            "APPROVED" => Ok(BookingStatus::Approved),
            "REJECTED" => Ok(BookingStatus::Rejected),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

/// 予約一覧の絞り込み条件（クエリ専用）
///
/// ステータスと同名の値は`status()`で明示的にBookingStatusへ対応付ける。
/// 時間条件の値（CURRENT等）が永続化される状態に紛れ込むことはない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookingFilter {
    #[default]
    All,
    /// start < now < end
    Current,
    /// end < now
    Past,
    /// start > now
    Future,
    Waiting,
    Approved,
    Rejected,
}

impl BookingFilter {
    /// ステータスによる絞り込みの場合、その対象ステータス
    pub fn status(&self) -> Option<BookingStatus> {
        match self {
            BookingFilter::Waiting => Some(BookingStatus::Waiting),
            BookingFilter::Approved => Some(BookingStatus::Approved),
            BookingFilter::Rejected => Some(BookingStatus::Rejected),
            BookingFilter::All
            | BookingFilter::Current
            | BookingFilter::Past
            | BookingFilter::Future => None,
        }
    }

    /// 純粋関数：予約が条件に一致するか
    pub fn matches(&self, booking: &Booking, now: DateTime<Utc>) -> bool {
        match self {
            BookingFilter::All => true,
            BookingFilter::Current => booking.start < now && now < booking.end,
            BookingFilter::Past => booking.end < now,
            BookingFilter::Future => booking.start > now,
            BookingFilter::Waiting | BookingFilter::Approved | BookingFilter::Rejected => {
                self.status() == Some(booking.status)
            }
        }
    }
}

impl std::str::FromStr for BookingFilter {
    type Err = String;

    /// 大文字・小文字を区別せずにパースする
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ALL" => Ok(BookingFilter::All),
            "CURRENT" => Ok(BookingFilter::Current),
            "PAST" => Ok(BookingFilter::Past),
            "FUTURE" => Ok(BookingFilter::Future),
            "WAITING" => Ok(BookingFilter::Waiting),
            "APPROVED" => Ok(BookingFilter::Approved),
            "REJECTED" => Ok(BookingFilter::Rejected),
            _ => Err(format!("Unknown state: {}", s)),
        }
    }
}

// ============================================================================
// 予約
// ============================================================================

/// 予約 - あるユーザーによる1つのアイテムの1回の予約
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub item_id: ItemId,
    pub booker_id: UserId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
}

/// 登録前の予約
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub item_id: ItemId,
    pub booker_id: UserId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
}

/// 予約期間
///
/// 不変条件：start < end かつ start, end ともに作成時点以降。
/// `BookingPeriod::new`を通してのみ作成できるため、この型の値は常に有効。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl BookingPeriod {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, CreateBookingError> {
        if start >= end || start < now || end < now {
            return Err(CreateBookingError::InvalidPeriod);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// 純粋関数：予約を申し込む
///
/// ビジネスルール：
/// - 所有者は自分のアイテムを予約できない（貸出可否に関係なく）
/// - 貸出不可のアイテムは予約できない
/// - 新しい予約はWAITING
///
/// 副作用なし。保存すべきNewBookingを返す。
pub fn request_booking(
    item: &Item,
    booker_id: UserId,
    period: BookingPeriod,
) -> Result<NewBooking, CreateBookingError> {
    if item.owner_id == booker_id {
        return Err(CreateBookingError::BookerIsOwner);
    }
    if !item.available {
        return Err(CreateBookingError::UnavailableItem);
    }

    Ok(NewBooking {
        item_id: item.id,
        booker_id,
        start: period.start(),
        end: period.end(),
        status: BookingStatus::Waiting,
    })
}

/// 純粋関数：予約を承認・却下する
///
/// ビジネスルール：
/// - アイテムの所有者のみ判断できる
/// - 現在と同じステータスへの変更はエラー（何もしない扱いにはしない）
/// - 承認・却下済みの予約は反対の結果にも変更できない
///
/// 副作用なし。遷移後のステータスを返す。
pub fn decide(
    booking: &Booking,
    item: &Item,
    actor: UserId,
    approved: bool,
) -> Result<BookingStatus, DecideBookingError> {
    if item.owner_id != actor {
        return Err(DecideBookingError::CannotApprove);
    }

    let target = if approved {
        BookingStatus::Approved
    } else {
        BookingStatus::Rejected
    };

    if booking.status == target {
        return Err(DecideBookingError::SameStatus(booking.status));
    }
    if booking.status.is_decided() {
        return Err(DecideBookingError::AlreadyDecided(booking.status));
    }

    Ok(target)
}

/// 純粋関数：予約を参照できるか（予約者またはアイテム所有者のみ）
pub fn can_view(booking: &Booking, item_owner: UserId, user: UserId) -> bool {
    booking.booker_id == user || item_owner == user
}

/// 純粋関数：コメント資格となる予約か
///
/// 承認済みかつ終了済み（end < now）であること。
pub fn is_completed_approved(booking: &Booking, now: DateTime<Utc>) -> bool {
    booking.status == BookingStatus::Approved && booking.end < now
}

// ============================================================================
// 直近・次回の予約
// ============================================================================

/// 「直近の予約」の候補か
///
/// 終了済み、または現在進行中で、却下されていないもの。
pub fn is_last_candidate(booking: &Booking, now: DateTime<Utc>) -> bool {
    booking.status != BookingStatus::Rejected
        && (booking.end < now || (booking.start < now && booking.end > now))
}

/// 「次回の予約」の候補か
///
/// 開始前で、却下されていないもの。
pub fn is_next_candidate(booking: &Booking, now: DateTime<Utc>) -> bool {
    booking.status != BookingStatus::Rejected && booking.start > now
}

/// 純粋関数：アイテムごとの直近の予約
///
/// 候補のうち終了日時が最も遅いものを1件ずつ選ぶ（同時刻はIDの大きい方）。
pub fn last_per_item<'a>(
    bookings: impl IntoIterator<Item = &'a Booking>,
    now: DateTime<Utc>,
) -> HashMap<ItemId, Booking> {
    let mut last: HashMap<ItemId, Booking> = HashMap::new();
    for booking in bookings
        .into_iter()
        .filter(|b| is_last_candidate(b, now))
    {
        let replace = last
            .get(&booking.item_id)
            .is_none_or(|current| (booking.end, booking.id) > (current.end, current.id));
        if replace {
            last.insert(booking.item_id, booking.clone());
        }
    }
    last
}

/// 純粋関数：アイテムごとの次回の予約
///
/// 候補のうち開始日時が最も早いものを1件ずつ選ぶ（同時刻はIDの小さい方）。
pub fn next_per_item<'a>(
    bookings: impl IntoIterator<Item = &'a Booking>,
    now: DateTime<Utc>,
) -> HashMap<ItemId, Booking> {
    let mut next: HashMap<ItemId, Booking> = HashMap::new();
    for booking in bookings
        .into_iter()
        .filter(|b| is_next_candidate(b, now))
    {
        let replace = next
            .get(&booking.item_id)
            .is_none_or(|current| (booking.start, booking.id) < (current.start, current.id));
        if replace {
            next.insert(booking.item_id, booking.clone());
        }
    }
    next
}
