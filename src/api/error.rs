use crate::application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(ApplicationError);

impl ApiError {
    /// リクエストの形式不正（ヘッダー、クエリ、ボディ）
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError(ApplicationError::Validation(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        status_and_code(&self.0).0
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        ApiError(err)
    }
}

fn status_and_code(err: &ApplicationError) -> (StatusCode, &'static str) {
    match err {
        // 400 Bad Request - 入力不正、状態遷移違反
        ApplicationError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ApplicationError::UnavailableItem => (StatusCode::BAD_REQUEST, "UNAVAILABLE_ITEM"),
        ApplicationError::SameApproveStatus(_) => {
            (StatusCode::BAD_REQUEST, "SAME_APPROVE_STATUS")
        }
        ApplicationError::AlreadyDecided(_) => (StatusCode::BAD_REQUEST, "ALREADY_DECIDED"),
        ApplicationError::CannotComment => (StatusCode::BAD_REQUEST, "CANNOT_COMMENT"),

        // 404 Not Found - 存在しない、または権限がない
        ApplicationError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ApplicationError::BookerIsOwner => (StatusCode::NOT_FOUND, "BOOKER_IS_OWNER"),
        ApplicationError::CannotApprove => (StatusCode::NOT_FOUND, "CANNOT_APPROVE"),
        ApplicationError::NoAccessToBook => (StatusCode::NOT_FOUND, "NO_ACCESS_TO_BOOK"),
        ApplicationError::NotOwner => (StatusCode::NOT_FOUND, "NOT_OWNER"),

        // 409 Conflict
        ApplicationError::DuplicateEmail => (StatusCode::CONFLICT, "DUPLICATE_EMAIL"),

        // 500 Internal Server Error - システム障害
        ApplicationError::Repository(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = status_and_code(&self.0);

        let message = match &self.0 {
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ApplicationError::Repository(e) => {
                tracing::error!("Repository error: {}", e);
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
