use sqlx::SqlitePool;
use thiserror::Error;

use super::models::User;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("username '{0}' already exists")]
    DuplicateUsername(String),

    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

/// User records. Username uniqueness is enforced by the `users` table's
/// UNIQUE constraint, so concurrent registrations of one name cannot both
/// succeed.
#[derive(Clone)]
pub struct CredentialStore {
    pool: SqlitePool,
}

impl CredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, CredentialError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn create(&self, username: &str, password_hash: &str) -> Result<User, CredentialError> {
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
             RETURNING id, username, password_hash, created_at",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(CredentialError::DuplicateUsername(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn count_by_username(&self, username: &str) -> Result<i64, CredentialError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
