use crate::domain::{self, NewUser, User, UserId, UserPatch, commands::*};
use crate::ports::EmailAlreadyUsed;

use super::dependencies::{ServiceDependencies, require_user};
use super::errors::{ApplicationError, Result};

/// リポジトリのエラーを変換する
///
/// 一意制約違反はDuplicateEmailとして扱う。
fn map_user_storage_error(e: Box<dyn std::error::Error + Send + Sync>) -> ApplicationError {
    if e.is::<EmailAlreadyUsed>() {
        ApplicationError::DuplicateEmail
    } else {
        ApplicationError::Repository(e)
    }
}

/// ユーザーを登録する
///
/// ビジネスルール：
/// - 名前は空白のみ不可、メールアドレスは`local@domain`の形式
/// - メールアドレスは他のユーザーと重複しない
pub async fn create_user(deps: &ServiceDependencies, cmd: CreateUser) -> Result<User> {
    let new_user = NewUser::new(cmd.name, cmd.email)?;

    let existing = deps
        .users
        .find_by_email(&new_user.email)
        .await
        .map_err(ApplicationError::Repository)?;
    if existing.is_some() {
        return Err(ApplicationError::DuplicateEmail);
    }

    let user = deps
        .users
        .insert(new_user)
        .await
        .map_err(map_user_storage_error)?;

    tracing::debug!(user_id = %user.id, "user created");
    Ok(user)
}

/// ユーザーを部分更新する
///
/// 指定された項目のみ上書きする。自分自身のメールアドレスの再指定は重複としない。
pub async fn update_user(deps: &ServiceDependencies, cmd: UpdateUser) -> Result<User> {
    let current = require_user(deps, cmd.user_id).await?;

    let patch = UserPatch {
        name: cmd.name,
        email: cmd.email,
    };
    let email_changed = patch.email.is_some();
    let updated = domain::user::apply_patch(&current, patch)?;

    if email_changed {
        let holder = deps
            .users
            .find_by_email(&updated.email)
            .await
            .map_err(ApplicationError::Repository)?;
        if holder.is_some_and(|other| other.id != updated.id) {
            return Err(ApplicationError::DuplicateEmail);
        }
    }

    let saved = deps
        .users
        .update(updated)
        .await
        .map_err(map_user_storage_error)?
        .ok_or_else(|| ApplicationError::not_found("User", cmd.user_id))?;

    tracing::debug!(user_id = %saved.id, "user updated");
    Ok(saved)
}

/// ユーザーを削除する
pub async fn delete_user(deps: &ServiceDependencies, user_id: UserId) -> Result<()> {
    let deleted = deps
        .users
        .delete(user_id)
        .await
        .map_err(ApplicationError::Repository)?;

    if !deleted {
        return Err(ApplicationError::not_found("User", user_id));
    }

    tracing::debug!(user_id = %user_id, "user deleted");
    Ok(())
}

pub async fn get_user(deps: &ServiceDependencies, user_id: UserId) -> Result<User> {
    require_user(deps, user_id).await
}

/// 全ユーザーをID順で取得する
pub async fn list_users(deps: &ServiceDependencies) -> Result<Vec<User>> {
    deps.users
        .find_all()
        .await
        .map_err(ApplicationError::Repository)
}
