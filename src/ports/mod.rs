pub mod booking_repository;
pub mod comment_repository;
pub mod item_repository;
pub mod request_repository;
pub mod user_repository;

pub use booking_repository::*;
pub use comment_repository::*;
pub use item_repository::*;
pub use request_repository::*;
pub use user_repository::*;

/// ポート共通の結果型
///
/// 実装ごとのエラー（sqlx::Error、ロック汚染など）をそのまま運べるよう
/// トレイトオブジェクトで受ける。
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
