use crate::domain::{NewUser, User, UserId};
use async_trait::async_trait;

use super::Result;

/// メールアドレスの一意制約違反
///
/// アダプタはストレージの一意制約違反をこのエラーに変換して返す。
/// アプリケーション層は`is::<EmailAlreadyUsed>()`で判別する。
#[derive(Debug, thiserror::Error)]
#[error("email is already used: {0}")]
pub struct EmailAlreadyUsed(pub String);

/// ユーザーリポジトリポート
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーを登録し、採番されたIDを持つUserを返す
    async fn insert(&self, user: NewUser) -> Result<User>;

    /// ユーザーを上書き保存する
    ///
    /// 該当IDが存在しない場合はNone。
    async fn update(&self, user: User) -> Result<Option<User>>;

    /// ユーザーを削除する
    ///
    /// 所有するアイテム、予約、コメント、リクエストも合わせて削除される。
    /// 該当IDが存在しなかった場合はfalse。
    async fn delete(&self, user_id: UserId) -> Result<bool>;

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>>;

    /// 複数IDをまとめて取得する（存在しないIDは結果に含まれない）
    async fn find_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// 全ユーザーをID順で取得する
    async fn find_all(&self) -> Result<Vec<User>>;
}
