use serde::{Deserialize, Serialize};

use super::{InvalidField, UserId};

/// ユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// 登録前のユーザー（IDはストレージで採番）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl NewUser {
    /// 入力値を検証して作成する
    ///
    /// - 名前は空白のみ不可
    /// - メールアドレスは`local@domain`の形式
    pub fn new(name: String, email: String) -> Result<Self, InvalidField> {
        validate_name(&name)?;
        validate_email(&email)?;
        Ok(Self { name, email })
    }
}

/// ユーザーの部分更新（Noneの項目は現在値を維持）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// 純粋関数：部分更新を適用する
///
/// 指定された項目のみを上書きした新しいUserを返す。
pub fn apply_patch(user: &User, patch: UserPatch) -> Result<User, InvalidField> {
    if let Some(name) = &patch.name {
        validate_name(name)?;
    }
    if let Some(email) = &patch.email {
        validate_email(email)?;
    }

    Ok(User {
        id: user.id,
        name: patch.name.unwrap_or_else(|| user.name.clone()),
        email: patch.email.unwrap_or_else(|| user.email.clone()),
    })
}

fn validate_name(name: &str) -> Result<(), InvalidField> {
    if name.trim().is_empty() {
        return Err(InvalidField::new("name", "must not be blank"));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), InvalidField> {
    let invalid = || InvalidField::new("email", "must be a well-formed email address");

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(())
}
