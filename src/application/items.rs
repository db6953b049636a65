use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::domain::{
    self, Booking, Item, ItemId, ItemPatch, NewItem, Pagination, UserId, commands::*,
};

use super::comments::load_comment_details;
use super::dependencies::{ServiceDependencies, require_item, require_request, require_user};
use super::errors::{ApplicationError, Result};
use super::views::ItemDetails;

/// アイテムを登録する
///
/// ビジネスルール：
/// - 名前は空白のみ不可、説明と貸出可否は必須
/// - 所有者が存在すること
/// - リクエストへの回答として登録する場合、そのリクエストが存在すること
pub async fn create_item(deps: &ServiceDependencies, cmd: CreateItem) -> Result<Item> {
    let description = cmd
        .description
        .ok_or_else(|| ApplicationError::Validation("description: must be provided".to_string()))?;
    let available = cmd
        .available
        .ok_or_else(|| ApplicationError::Validation("available: must be provided".to_string()))?;
    let new_item = NewItem::new(cmd.owner_id, cmd.name, description, available, cmd.request_id)?;

    require_user(deps, cmd.owner_id).await?;
    if let Some(request_id) = cmd.request_id {
        require_request(deps, request_id).await?;
    }

    let item = deps
        .items
        .insert(new_item)
        .await
        .map_err(ApplicationError::Repository)?;

    tracing::debug!(item_id = %item.id, owner_id = %item.owner_id, "item created");
    Ok(item)
}

/// アイテムを部分更新する（所有者のみ）
pub async fn update_item(deps: &ServiceDependencies, cmd: UpdateItem) -> Result<Item> {
    require_user(deps, cmd.user_id).await?;
    let current = require_item(deps, cmd.item_id).await?;

    let patch = ItemPatch {
        name: cmd.name,
        description: cmd.description,
        available: cmd.available,
    };
    if patch.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(ApplicationError::Validation(
            "name: must not be blank".to_string(),
        ));
    }
    let updated = domain::item::apply_patch(&current, cmd.user_id, patch)?;

    let saved = deps
        .items
        .update(updated)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or_else(|| ApplicationError::not_found("Item", cmd.item_id))?;

    tracing::debug!(item_id = %saved.id, "item updated");
    Ok(saved)
}

/// アイテムを取得する
pub async fn get_item(deps: &ServiceDependencies, item_id: ItemId) -> Result<Item> {
    require_item(deps, item_id).await
}

/// 所有者のアイテム一覧（ID順）
pub async fn get_items_by_owner(deps: &ServiceDependencies, owner_id: UserId) -> Result<Vec<Item>> {
    require_user(deps, owner_id).await?;
    deps.items
        .find_by_owner(owner_id)
        .await
        .map_err(ApplicationError::Repository)
}

/// 貸出可能なアイテムを検索する
///
/// ページング指定を先に検証する。検索語が空白のみの場合はストレージを参照せず空を返す。
pub async fn search_items(
    deps: &ServiceDependencies,
    text: &str,
    from: i64,
    size: i64,
) -> Result<Vec<Item>> {
    let page = Pagination::new(from, size)?;

    let Some(needle) = domain::item::normalize_search_text(text) else {
        return Ok(Vec::new());
    };

    deps.items
        .search(&needle, page)
        .await
        .map_err(ApplicationError::Repository)
}

/// アイテム詳細を取得する
///
/// コメントは常に含める。直近・次回の予約は参照者が所有者の場合のみ含める。
pub async fn get_item_details(
    deps: &ServiceDependencies,
    item_id: ItemId,
    user_id: UserId,
    now: DateTime<Utc>,
) -> Result<ItemDetails> {
    require_user(deps, user_id).await?;
    let item = get_item(deps, item_id).await?;

    let mut comments = load_comment_details(deps, &[item.id]).await?;
    let comments = comments.remove(&item.id).unwrap_or_default();

    let (last_booking, next_booking) = if item.owner_id == user_id {
        let (mut last, mut next) = load_booking_slots(deps, &[item.id], now).await?;
        (last.remove(&item.id), next.remove(&item.id))
    } else {
        (None, None)
    };

    Ok(ItemDetails {
        item,
        last_booking,
        next_booking,
        comments,
    })
}

/// 所有者の全アイテムを直近・次回の予約とコメント付きで取得する
///
/// 予約のあるアイテム（ID順）を先に、どちらもないアイテム（ID順）を後に並べる。
pub async fn get_owner_items_details(
    deps: &ServiceDependencies,
    owner_id: UserId,
    now: DateTime<Utc>,
) -> Result<Vec<ItemDetails>> {
    let items = get_items_by_owner(deps, owner_id).await?;
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let item_ids: Vec<ItemId> = items.iter().map(|i| i.id).collect();
    let ((mut last, mut next), mut comments) = futures::try_join!(
        load_booking_slots(deps, &item_ids, now),
        load_comment_details(deps, &item_ids),
    )?;

    let (booked, idle): (Vec<ItemDetails>, Vec<ItemDetails>) = items
        .into_iter()
        .map(|item| ItemDetails {
            last_booking: last.remove(&item.id),
            next_booking: next.remove(&item.id),
            comments: comments.remove(&item.id).unwrap_or_default(),
            item,
        })
        .partition(|details| details.last_booking.is_some() || details.next_booking.is_some());

    Ok(booked.into_iter().chain(idle).collect())
}

type BookingSlots = (HashMap<ItemId, Booking>, HashMap<ItemId, Booking>);

/// アイテムごとの直近・次回の予約を取得する
async fn load_booking_slots(
    deps: &ServiceDependencies,
    item_ids: &[ItemId],
    now: DateTime<Utc>,
) -> Result<BookingSlots> {
    let (last, next) = futures::try_join!(
        deps.bookings.find_last_for_items(item_ids, now),
        deps.bookings.find_next_for_items(item_ids, now),
    )
    .map_err(ApplicationError::Repository)?;

    let by_item = |bookings: Vec<Booking>| -> HashMap<ItemId, Booking> {
        bookings.into_iter().map(|b| (b.item_id, b)).collect()
    };
    Ok((by_item(last), by_item(next)))
}
