use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::domain::{
    self, Booking, BookingFilter, BookingId, BookingPeriod, BookingStatus, Item, ItemId,
    Pagination, User, UserId, commands::*,
};

use super::dependencies::{ServiceDependencies, require_item, require_user};
use super::errors::{ApplicationError, Result};
use super::views::BookingDetails;

/// 予約を申し込む
///
/// ビジネスルール：
/// - 開始 < 終了、どちらも申込時点以降
/// - 所有者は自分のアイテムを予約できない
/// - 貸出不可のアイテムは予約できない
/// - 新しい予約はWAITING
pub async fn create_booking(
    deps: &ServiceDependencies,
    cmd: CreateBooking,
) -> Result<BookingDetails> {
    // 1. 予約期間の検証
    let period = BookingPeriod::new(cmd.start, cmd.end, cmd.requested_at)?;

    // 2. アイテムの取得
    let item = require_item(deps, cmd.item_id).await?;

    // 3. ドメイン層の純粋関数で所有者・貸出可否を確認
    let new_booking = domain::booking::request_booking(&item, cmd.booker_id, period)?;

    // 4. 予約者の存在確認
    let booker = require_user(deps, cmd.booker_id).await?;

    // 5. 保存
    let booking = deps
        .bookings
        .insert(new_booking)
        .await
        .map_err(ApplicationError::Repository)?;

    tracing::debug!(booking_id = %booking.id, item_id = %item.id, "booking created");
    Ok(BookingDetails {
        booking,
        item,
        booker,
    })
}

/// 予約を承認・却下する（アイテム所有者のみ）
///
/// 書き込みは読み取り時点のステータスを条件とする。
/// 並行する判断に負けた場合はAlreadyDecided。
pub async fn decide_booking(
    deps: &ServiceDependencies,
    cmd: DecideBooking,
) -> Result<BookingDetails> {
    // 1. 参照権限の確認を含めて予約を取得
    let details = get_booking(deps, cmd.booking_id, cmd.owner_id).await?;

    // 2. ドメイン層の純粋関数で遷移先を決定
    let target =
        domain::booking::decide(&details.booking, &details.item, cmd.owner_id, cmd.approved)?;

    // 3. 条件付き更新
    let expected = details.booking.status;
    let updated = deps
        .bookings
        .update_status(cmd.booking_id, expected, target)
        .await
        .map_err(ApplicationError::Repository)?;
    let Some(booking) = updated else {
        return Err(lost_decision(deps, cmd.booking_id, target).await);
    };

    tracing::debug!(booking_id = %booking.id, status = %booking.status, "booking decided");
    Ok(BookingDetails { booking, ..details })
}

/// 条件付き更新に失敗した理由を、現在のステータスから判定する
async fn lost_decision(
    deps: &ServiceDependencies,
    booking_id: BookingId,
    target: BookingStatus,
) -> ApplicationError {
    match deps.bookings.find_by_id(booking_id).await {
        Ok(Some(current)) if current.status == target => {
            ApplicationError::SameApproveStatus(current.status)
        }
        Ok(Some(current)) => ApplicationError::AlreadyDecided(current.status),
        Ok(None) => ApplicationError::not_found("Booking", booking_id),
        Err(e) => ApplicationError::Repository(e),
    }
}

/// 予約を取得する（予約者またはアイテム所有者のみ）
pub async fn get_booking(
    deps: &ServiceDependencies,
    booking_id: BookingId,
    user_id: UserId,
) -> Result<BookingDetails> {
    require_user(deps, user_id).await?;

    let booking = deps
        .bookings
        .find_by_id(booking_id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or_else(|| ApplicationError::not_found("Booking", booking_id))?;

    let item = require_item(deps, booking.item_id).await?;
    if !domain::booking::can_view(&booking, item.owner_id, user_id) {
        return Err(ApplicationError::NoAccessToBook);
    }

    let booker = require_user(deps, booking.booker_id).await?;
    Ok(BookingDetails {
        booking,
        item,
        booker,
    })
}

/// 予約者としての予約一覧
pub async fn list_booker_bookings(
    deps: &ServiceDependencies,
    booker_id: UserId,
    filter: BookingFilter,
    from: i64,
    size: i64,
    now: DateTime<Utc>,
) -> Result<Vec<BookingDetails>> {
    let page = Pagination::new(from, size)?;
    let booker = require_user(deps, booker_id).await?;

    let bookings = deps
        .bookings
        .find_by_booker(booker_id, filter, now, page)
        .await
        .map_err(ApplicationError::Repository)?;

    let item_ids = distinct(bookings.iter().map(|b| b.item_id));
    let items = deps
        .items
        .find_by_ids(&item_ids)
        .await
        .map_err(ApplicationError::Repository)?;

    attach_details(bookings, items, vec![booker])
}

/// 所有するアイテムへの予約一覧
pub async fn list_owner_bookings(
    deps: &ServiceDependencies,
    owner_id: UserId,
    filter: BookingFilter,
    from: i64,
    size: i64,
    now: DateTime<Utc>,
) -> Result<Vec<BookingDetails>> {
    let page = Pagination::new(from, size)?;
    require_user(deps, owner_id).await?;

    let items = deps
        .items
        .find_by_owner(owner_id)
        .await
        .map_err(ApplicationError::Repository)?;
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let item_ids: Vec<ItemId> = items.iter().map(|i| i.id).collect();
    let bookings = deps
        .bookings
        .find_by_items(&item_ids, filter, now, page)
        .await
        .map_err(ApplicationError::Repository)?;

    let booker_ids = distinct(bookings.iter().map(|b| b.booker_id));
    let bookers = deps
        .users
        .find_by_ids(&booker_ids)
        .await
        .map_err(ApplicationError::Repository)?;

    attach_details(bookings, items, bookers)
}

fn distinct<T: Copy + Eq + std::hash::Hash>(ids: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

/// 予約の並び順を保ったまま、アイテムと予約者を付与する
fn attach_details(
    bookings: Vec<Booking>,
    items: Vec<Item>,
    users: Vec<User>,
) -> Result<Vec<BookingDetails>> {
    let items: HashMap<ItemId, Item> = items.into_iter().map(|i| (i.id, i)).collect();
    let users: HashMap<UserId, User> = users.into_iter().map(|u| (u.id, u)).collect();

    bookings
        .into_iter()
        .map(|booking| {
            let item = items
                .get(&booking.item_id)
                .cloned()
                .ok_or_else(|| ApplicationError::not_found("Item", booking.item_id))?;
            let booker = users
                .get(&booking.booker_id)
                .cloned()
                .ok_or_else(|| ApplicationError::not_found("User", booking.booker_id))?;
            Ok(BookingDetails {
                booking,
                item,
                booker,
            })
        })
        .collect()
}
