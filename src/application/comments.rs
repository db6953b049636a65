use crate::domain::{Comment, ItemId, NewComment, UserId, commands::AddComment};
use std::collections::{HashMap, HashSet};

use super::dependencies::{ServiceDependencies, require_item, require_user};
use super::errors::{ApplicationError, Result};
use super::views::CommentDetails;

/// コメントを投稿する
///
/// ビジネスルール：
/// - 投稿者とアイテムが存在すること
/// - 投稿者がそのアイテムを承認済みで予約し、その予約が終了していること
/// - 本文は空白のみ不可、1000文字以内
pub async fn add_comment(deps: &ServiceDependencies, cmd: AddComment) -> Result<CommentDetails> {
    let new_comment = NewComment::new(cmd.item_id, cmd.author_id, cmd.text, cmd.created_at)?;

    let author = require_user(deps, cmd.author_id).await?;
    let item = require_item(deps, cmd.item_id).await?;

    let completed = deps
        .bookings
        .find_completed_approved(author.id, item.id, cmd.created_at)
        .await
        .map_err(ApplicationError::Repository)?;
    if completed.is_empty() {
        return Err(ApplicationError::CannotComment);
    }

    let comment = deps
        .comments
        .insert(new_comment)
        .await
        .map_err(ApplicationError::Repository)?;

    tracing::debug!(comment_id = %comment.id, item_id = %item.id, "comment added");
    Ok(CommentDetails::new(comment, author.name))
}

/// 指定アイテムのコメントを投稿者名付きで取得し、アイテムごとにまとめる
pub(super) async fn load_comment_details(
    deps: &ServiceDependencies,
    item_ids: &[ItemId],
) -> Result<HashMap<ItemId, Vec<CommentDetails>>> {
    if item_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let comments: Vec<Comment> = deps
        .comments
        .find_by_items(item_ids)
        .await
        .map_err(ApplicationError::Repository)?;

    let author_ids: Vec<UserId> = comments
        .iter()
        .map(|c| c.author_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let authors: HashMap<UserId, String> = deps
        .users
        .find_by_ids(&author_ids)
        .await
        .map_err(ApplicationError::Repository)?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect();

    let mut grouped: HashMap<ItemId, Vec<CommentDetails>> = HashMap::new();
    for comment in comments {
        let author_name = authors.get(&comment.author_id).cloned().unwrap_or_default();
        grouped
            .entry(comment.item_id)
            .or_default()
            .push(CommentDetails::new(comment, author_name));
    }
    Ok(grouped)
}
