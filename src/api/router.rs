use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, add_comment, create_booking, create_item, create_request, create_user,
    decide_booking, delete_user, get_booking, get_item, get_request, get_user,
    list_booker_bookings, list_other_requests, list_own_requests, list_owner_bookings,
    list_owner_items, list_users, search_items, update_item, update_user,
};

/// Creates the API router with all sharing endpoints
///
/// Every endpoint except `/users` and `/health` identifies the caller
/// through the `X-Sharer-User-Id` header.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Users
        .route("/users", post(create_user).get(list_users))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
        // Items and comments
        .route("/items", post(create_item).get(list_owner_items))
        .route("/items/search", get(search_items))
        .route("/items/:id", get(get_item).patch(update_item))
        .route("/items/:id/comment", post(add_comment))
        // Bookings
        .route("/bookings", post(create_booking).get(list_booker_bookings))
        .route("/bookings/owner", get(list_owner_bookings))
        .route("/bookings/:id", get(get_booking).patch(decide_booking))
        // Item requests
        .route("/requests", post(create_request).get(list_own_requests))
        .route("/requests/all", get(list_other_requests))
        .route("/requests/:id", get(get_request))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
