pub mod booking_repository;
pub mod comment_repository;
pub mod item_repository;
pub mod request_repository;
pub mod user_repository;

use sqlx::PgPool;
use std::sync::Arc;

use crate::application::ServiceDependencies;

// パブリックに型を再エクスポート
pub use booking_repository::BookingRepository as PostgresBookingRepository;
pub use comment_repository::CommentRepository as PostgresCommentRepository;
pub use item_repository::ItemRepository as PostgresItemRepository;
pub use request_repository::RequestRepository as PostgresRequestRepository;
pub use user_repository::UserRepository as PostgresUserRepository;

/// 1つのコネクションプールを共有する全リポジトリを組み立てる
pub fn service_dependencies(pool: PgPool) -> ServiceDependencies {
    ServiceDependencies {
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        items: Arc::new(PostgresItemRepository::new(pool.clone())),
        bookings: Arc::new(PostgresBookingRepository::new(pool.clone())),
        comments: Arc::new(PostgresCommentRepository::new(pool.clone())),
        requests: Arc::new(PostgresRequestRepository::new(pool)),
    }
}

/// 行データの変換エラー
fn invalid_data(message: String) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}
