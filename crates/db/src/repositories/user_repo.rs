//! Repository for the `users` table.
//!
//! The directory only maps usernames to ids; credentials live elsewhere.

use sqlx::PgPool;
use wayside_core::types::DbId;

use crate::models::user::{CreateUser, User};

/// Column list for `users` queries.
const COLUMNS: &str = "id, username, first_name, last_name, email, created_at";

/// Provides lookups over the user directory.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, first_name, last_name, email) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(input.username.trim())
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .fetch_one(pool)
            .await
    }

    /// Resolve a username to its id. `None` when no such user exists.
    pub async fn find_id_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await
    }
}
