use crate::domain::{
    self, NewItemRequest, Pagination, RequestAnswer, RequestId, UserId, commands::CreateRequest,
};

use super::dependencies::{ServiceDependencies, require_request, require_user};
use super::errors::{ApplicationError, Result};
use super::views::RequestDetails;

/// アイテムリクエストを作成する
pub async fn create_request(
    deps: &ServiceDependencies,
    cmd: CreateRequest,
) -> Result<RequestDetails> {
    let new_request = NewItemRequest::new(cmd.requestor_id, cmd.description, cmd.created_at)?;
    let requestor = require_user(deps, cmd.requestor_id).await?;

    let request = deps
        .requests
        .insert(new_request)
        .await
        .map_err(ApplicationError::Repository)?;

    tracing::debug!(request_id = %request.id, "item request created");
    Ok(RequestDetails { request, requestor })
}

/// 自分のリクエスト一覧（新しい順）
///
/// 各リクエストには他のユーザーが登録した回答アイテムを付与する。
pub async fn get_own_requests(
    deps: &ServiceDependencies,
    user_id: UserId,
) -> Result<Vec<RequestAnswer>> {
    require_user(deps, user_id).await?;

    let requests = deps
        .requests
        .find_by_requestor(user_id)
        .await
        .map_err(ApplicationError::Repository)?;

    let request_ids: Vec<RequestId> = requests.iter().map(|r| r.id).collect();
    let items = if request_ids.is_empty() {
        Vec::new()
    } else {
        deps.items
            .find_by_requests(&request_ids, Some(user_id))
            .await
            .map_err(ApplicationError::Repository)?
    };

    Ok(domain::request::group_answers(requests, items))
}

/// 他のユーザーのリクエスト一覧（新しい順、ページング）
pub async fn get_other_requests(
    deps: &ServiceDependencies,
    user_id: UserId,
    from: i64,
    size: i64,
) -> Result<Vec<RequestAnswer>> {
    let page = Pagination::new(from, size)?;
    require_user(deps, user_id).await?;

    let requests = deps
        .requests
        .find_by_other_requestors(user_id, page)
        .await
        .map_err(ApplicationError::Repository)?;

    let request_ids: Vec<RequestId> = requests.iter().map(|r| r.id).collect();
    let items = if request_ids.is_empty() {
        Vec::new()
    } else {
        deps.items
            .find_by_requests(&request_ids, None)
            .await
            .map_err(ApplicationError::Repository)?
    };

    Ok(domain::request::group_answers(requests, items))
}

/// リクエストを回答アイテム付きで取得する
pub async fn get_request(
    deps: &ServiceDependencies,
    user_id: UserId,
    request_id: RequestId,
) -> Result<RequestAnswer> {
    require_user(deps, user_id).await?;
    let request = require_request(deps, request_id).await?;

    let items = deps
        .items
        .find_by_requests(&[request.id], None)
        .await
        .map_err(ApplicationError::Repository)?;

    let mut answers = domain::request::group_answers(vec![request], items);
    answers
        .pop()
        .ok_or_else(|| ApplicationError::not_found("Request", request_id))
}
