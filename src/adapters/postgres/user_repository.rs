use crate::domain::{NewUser, User, UserId};
use crate::ports::{EmailAlreadyUsed, Result, UserRepository as UserRepositoryTrait};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

fn map_row_to_user(row: &PgRow) -> User {
    User {
        id: UserId::new(row.get("id")),
        name: row.get("name"),
        email: row.get("email"),
    }
}

/// 一意制約違反をEmailAlreadyUsedに変換する
fn map_write_error(e: sqlx::Error, email: &str) -> Box<dyn std::error::Error + Send + Sync> {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return Box::new(EmailAlreadyUsed(email.to_string()));
        }
    }
    Box::new(e)
}

/// UserRepositoryのPostgreSQL実装
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn insert(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user.email))?;

        Ok(map_row_to_user(&row))
    }

    async fn update(&self, user: User) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3
            WHERE id = $1
            RETURNING id, name, email
            "#,
        )
        .bind(user.id.value())
        .bind(&user.name)
        .bind(&user.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user.email))?;

        Ok(row.as_ref().map(map_row_to_user))
    }

    /// 関連データは外部キーのON DELETE CASCADEで削除される
    async fn delete(&self, user_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, email FROM users WHERE id = $1")
            .bind(user_id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_row_to_user))
    }

    async fn find_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<User>> {
        let ids: Vec<i64> = user_ids.iter().map(|id| id.value()).collect();
        let rows = sqlx::query("SELECT id, name, email FROM users WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(map_row_to_user).collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, email FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_row_to_user))
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT id, name, email FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(map_row_to_user).collect())
    }
}
