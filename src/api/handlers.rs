use crate::application::{self, ServiceDependencies};
use crate::domain::{BookingFilter, BookingId, ItemId, RequestId, UserId, commands::*};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::{
    error::ApiError,
    extract::{JsonBody, PathParam, QueryParams, SharerUserId},
    types::{
        ApprovalQuery, BookingListQuery, BookingResponse, CommentResponse, CreateBookingRequest,
        CreateCommentRequest, CreateItemRequest, CreateItemRequestRequest, CreateUserRequest,
        ItemDetailsResponse, ItemResponse, PageQuery, RequestAnswerResponse, RequestResponse,
        SearchQuery, UpdateItemRequest, UpdateUserRequest, UserResponse,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Users
// ============================================================================

/// POST /users - ユーザーを登録
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let cmd = CreateUser {
        name: req.name,
        email: req.email,
    };
    let user = application::create_user(&state.service_deps, cmd).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// PATCH /users/:id - ユーザーを部分更新
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    PathParam(user_id): PathParam<i64>,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let cmd = UpdateUser {
        user_id: UserId::new(user_id),
        name: req.name,
        email: req.email,
    };
    let user = application::update_user(&state.service_deps, cmd).await?;
    Ok(Json(user.into()))
}

/// DELETE /users/:id - ユーザーを削除
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    PathParam(user_id): PathParam<i64>,
) -> Result<StatusCode, ApiError> {
    application::delete_user(&state.service_deps, UserId::new(user_id)).await?;
    Ok(StatusCode::OK)
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    PathParam(user_id): PathParam<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = application::get_user(&state.service_deps, UserId::new(user_id)).await?;
    Ok(Json(user.into()))
}

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = application::list_users(&state.service_deps).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

// ============================================================================
// Items
// ============================================================================

/// POST /items - アイテムを登録
///
/// `requestId`を指定した場合、そのリクエストへの回答として登録される。
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    SharerUserId(owner_id): SharerUserId,
    JsonBody(req): JsonBody<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let cmd = CreateItem {
        owner_id,
        name: req.name,
        description: req.description,
        available: req.available,
        request_id: req.request_id.map(RequestId::new),
    };
    let item = application::create_item(&state.service_deps, cmd).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// PATCH /items/:id - アイテムを部分更新（所有者のみ）
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
    PathParam(item_id): PathParam<i64>,
    JsonBody(req): JsonBody<UpdateItemRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let cmd = UpdateItem {
        item_id: ItemId::new(item_id),
        user_id,
        name: req.name,
        description: req.description,
        available: req.available,
    };
    let item = application::update_item(&state.service_deps, cmd).await?;
    Ok(Json(item.into()))
}

/// GET /items/:id - アイテム詳細
///
/// 所有者が参照した場合のみ直近・次回の予約を含む。
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
    PathParam(item_id): PathParam<i64>,
) -> Result<Json<ItemDetailsResponse>, ApiError> {
    let details = application::get_item_details(
        &state.service_deps,
        ItemId::new(item_id),
        user_id,
        chrono::Utc::now(),
    )
    .await?;
    Ok(Json(details.into()))
}

/// GET /items - 自分のアイテム一覧（直近・次回の予約付き）
pub async fn list_owner_items(
    State(state): State<Arc<AppState>>,
    SharerUserId(owner_id): SharerUserId,
) -> Result<Json<Vec<ItemDetailsResponse>>, ApiError> {
    let items =
        application::get_owner_items_details(&state.service_deps, owner_id, chrono::Utc::now())
            .await?;
    Ok(Json(
        items.into_iter().map(ItemDetailsResponse::from).collect(),
    ))
}

/// GET /items/search?text=&from=&size= - 貸出可能なアイテムを検索
pub async fn search_items(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let items =
        application::search_items(&state.service_deps, &query.text, query.from, query.size)
            .await?;
    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

/// POST /items/:id/comment - コメントを投稿
///
/// 承認済みで終了した予約を持つユーザーのみ投稿できる。
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    SharerUserId(author_id): SharerUserId,
    PathParam(item_id): PathParam<i64>,
    JsonBody(req): JsonBody<CreateCommentRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    let cmd = AddComment {
        item_id: ItemId::new(item_id),
        author_id,
        text: req.text,
        created_at: chrono::Utc::now(),
    };
    let comment = application::add_comment(&state.service_deps, cmd).await?;
    Ok(Json(comment.into()))
}

// ============================================================================
// Bookings
// ============================================================================

/// POST /bookings - 予約を申し込む
///
/// 強制されるビジネスルール:
/// - 開始 < 終了、どちらも現在以降
/// - 所有者は自分のアイテムを予約できない
/// - 貸出不可のアイテムは予約できない
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    SharerUserId(booker_id): SharerUserId,
    JsonBody(req): JsonBody<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let cmd = CreateBooking {
        booker_id,
        item_id: ItemId::new(req.item_id),
        start: req.start,
        end: req.end,
        requested_at: chrono::Utc::now(),
    };
    let booking = application::create_booking(&state.service_deps, cmd).await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// PATCH /bookings/:id?approved= - 予約を承認・却下（アイテム所有者のみ）
pub async fn decide_booking(
    State(state): State<Arc<AppState>>,
    SharerUserId(owner_id): SharerUserId,
    PathParam(booking_id): PathParam<i64>,
    QueryParams(query): QueryParams<ApprovalQuery>,
) -> Result<Json<BookingResponse>, ApiError> {
    let cmd = DecideBooking {
        booking_id: BookingId::new(booking_id),
        owner_id,
        approved: query.approved,
    };
    let booking = application::decide_booking(&state.service_deps, cmd).await?;
    Ok(Json(booking.into()))
}

/// GET /bookings/:id - 予約を取得（予約者またはアイテム所有者のみ）
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
    PathParam(booking_id): PathParam<i64>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking =
        application::get_booking(&state.service_deps, BookingId::new(booking_id), user_id).await?;
    Ok(Json(booking.into()))
}

/// GET /bookings?state=&from=&size= - 自分が申し込んだ予約の一覧
pub async fn list_booker_bookings(
    State(state): State<Arc<AppState>>,
    SharerUserId(booker_id): SharerUserId,
    QueryParams(query): QueryParams<BookingListQuery>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let filter = parse_filter(&query.state)?;
    let bookings = application::list_booker_bookings(
        &state.service_deps,
        booker_id,
        filter,
        query.from,
        query.size,
        chrono::Utc::now(),
    )
    .await?;
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

/// GET /bookings/owner?state=&from=&size= - 自分のアイテムへの予約の一覧
pub async fn list_owner_bookings(
    State(state): State<Arc<AppState>>,
    SharerUserId(owner_id): SharerUserId,
    QueryParams(query): QueryParams<BookingListQuery>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let filter = parse_filter(&query.state)?;
    let bookings = application::list_owner_bookings(
        &state.service_deps,
        owner_id,
        filter,
        query.from,
        query.size,
        chrono::Utc::now(),
    )
    .await?;
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

/// stateクエリパラメータのパース（未知の値は "Unknown state: X" の400）
fn parse_filter(state: &str) -> Result<BookingFilter, ApiError> {
    state.parse::<BookingFilter>().map_err(ApiError::bad_request)
}

// ============================================================================
// Requests
// ============================================================================

/// POST /requests - アイテムリクエストを作成
pub async fn create_request(
    State(state): State<Arc<AppState>>,
    SharerUserId(requestor_id): SharerUserId,
    JsonBody(req): JsonBody<CreateItemRequestRequest>,
) -> Result<(StatusCode, Json<RequestResponse>), ApiError> {
    let cmd = CreateRequest {
        requestor_id,
        description: req.description,
        created_at: chrono::Utc::now(),
    };
    let request = application::create_request(&state.service_deps, cmd).await?;
    Ok((StatusCode::CREATED, Json(request.into())))
}

/// GET /requests - 自分のリクエスト一覧（回答アイテム付き）
pub async fn list_own_requests(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
) -> Result<Json<Vec<RequestAnswerResponse>>, ApiError> {
    let answers = application::get_own_requests(&state.service_deps, user_id).await?;
    Ok(Json(
        answers.into_iter().map(RequestAnswerResponse::from).collect(),
    ))
}

/// GET /requests/all?from=&size= - 他のユーザーのリクエスト一覧
pub async fn list_other_requests(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Vec<RequestAnswerResponse>>, ApiError> {
    let answers =
        application::get_other_requests(&state.service_deps, user_id, query.from, query.size)
            .await?;
    Ok(Json(
        answers.into_iter().map(RequestAnswerResponse::from).collect(),
    ))
}

/// GET /requests/:id - リクエストを回答アイテム付きで取得
pub async fn get_request(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
    PathParam(request_id): PathParam<i64>,
) -> Result<Json<RequestAnswerResponse>, ApiError> {
    let answer =
        application::get_request(&state.service_deps, user_id, RequestId::new(request_id)).await?;
    Ok(Json(answer.into()))
}
