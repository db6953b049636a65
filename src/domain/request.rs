use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{InvalidField, Item, RequestId, UserId};

/// アイテムリクエスト - 「こういう物を借りたい」という募集
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub id: RequestId,
    pub description: String,
    pub requestor_id: UserId,
    /// 作成後は変更されない
    pub created: DateTime<Utc>,
}

/// 登録前のリクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItemRequest {
    pub description: String,
    pub requestor_id: UserId,
    pub created: DateTime<Utc>,
}

impl NewItemRequest {
    pub fn new(
        requestor_id: UserId,
        description: String,
        created: DateTime<Utc>,
    ) -> Result<Self, InvalidField> {
        if description.trim().is_empty() {
            return Err(InvalidField::new("description", "must not be blank"));
        }
        Ok(Self {
            description,
            requestor_id,
            created,
        })
    }
}

/// リクエストとそれに応えたアイテム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestAnswer {
    pub request: ItemRequest,
    pub items: Vec<Item>,
}

/// 純粋関数：アイテムをリクエストごとにまとめる
///
/// リクエストの順序は入力のまま。応答のないリクエストは空のitemsを持つ。
/// どのリクエストにも属さないアイテムは捨てる。
pub fn group_answers(requests: Vec<ItemRequest>, items: Vec<Item>) -> Vec<RequestAnswer> {
    let mut by_request: HashMap<RequestId, Vec<Item>> = HashMap::new();
    for item in items {
        if let Some(request_id) = item.request_id {
            by_request.entry(request_id).or_default().push(item);
        }
    }

    requests
        .into_iter()
        .map(|request| {
            let mut items = by_request.remove(&request.id).unwrap_or_default();
            items.sort_by_key(|item| item.id);
            RequestAnswer { request, items }
        })
        .collect()
}
