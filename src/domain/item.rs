use serde::{Deserialize, Serialize};

use super::{InvalidField, ItemId, RequestId, UpdateItemError, UserId};

/// アイテム - ユーザーが貸し出す物品
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    /// falseの間は予約を受け付けない
    pub available: bool,
    pub owner_id: UserId,
    /// このアイテムが応えているリクエスト
    pub request_id: Option<RequestId>,
}

/// 登録前のアイテム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: UserId,
    pub request_id: Option<RequestId>,
}

impl NewItem {
    pub fn new(
        owner_id: UserId,
        name: String,
        description: String,
        available: bool,
        request_id: Option<RequestId>,
    ) -> Result<Self, InvalidField> {
        if name.trim().is_empty() {
            return Err(InvalidField::new("name", "must not be blank"));
        }
        Ok(Self {
            name,
            description,
            available,
            owner_id,
            request_id,
        })
    }
}

/// アイテムの部分更新
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

/// 純粋関数：アイテムを更新する
///
/// ビジネスルール：
/// - 所有者のみ更新可能
/// - 指定された項目のみ上書きし、所有者とリクエストへの参照は維持する
pub fn apply_patch(item: &Item, actor: UserId, patch: ItemPatch) -> Result<Item, UpdateItemError> {
    if item.owner_id != actor {
        return Err(UpdateItemError::NotOwner);
    }

    Ok(Item {
        name: patch.name.unwrap_or_else(|| item.name.clone()),
        description: patch.description.unwrap_or_else(|| item.description.clone()),
        available: patch.available.unwrap_or(item.available),
        ..item.clone()
    })
}

/// 検索語を正規化する
///
/// 空白のみの場合はNone（検索を行わない）。それ以外は小文字化した検索語。
pub fn normalize_search_text(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    Some(text.to_lowercase())
}

/// 純粋関数：検索条件に一致するか
///
/// 貸出可能なアイテムのうち、名前または説明に検索語を含むもの。
/// `needle`は`normalize_search_text`で小文字化済みであること。
pub fn matches_search(item: &Item, needle: &str) -> bool {
    item.available
        && (item.name.to_lowercase().contains(needle)
            || item.description.to_lowercase().contains(needle))
}
