use async_trait::async_trait;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::domain::UserId;

use super::error::ApiError;

/// 呼び出し元ユーザーを示すヘッダー
pub const SHARER_USER_ID_HEADER: &str = "X-Sharer-User-Id";

/// `X-Sharer-User-Id`ヘッダーから取り出した呼び出し元ユーザー
///
/// ヘッダーが無い、または整数でない場合は400。
#[derive(Debug, Clone, Copy)]
pub struct SharerUserId(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for SharerUserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(SHARER_USER_ID_HEADER)
            .ok_or_else(|| {
                ApiError::bad_request(format!("Missing header {}", SHARER_USER_ID_HEADER))
            })?;

        value
            .to_str()
            .ok()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(|id| SharerUserId(UserId::new(id)))
            .ok_or_else(|| {
                ApiError::bad_request(format!(
                    "Header {} must be an integer",
                    SHARER_USER_ID_HEADER
                ))
            })
    }
}

/// JSONボディ
///
/// 形式不正・必須項目の欠落をエラーレスポンス形式の400にする。
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(JsonBody(value))
    }
}

/// クエリパラメータ
///
/// パースできない値はエラーレスポンス形式の400にする。
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(QueryParams(value))
    }
}

/// パスパラメータ
///
/// `/users/abc`のように解釈できないIDをエラーレスポンス形式の400にする。
#[derive(Debug)]
pub struct PathParam<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(PathParam(value))
    }
}
