//! User directory model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use wayside_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for registering a user in the directory.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(custom(function = "wayside_core::validation::non_blank"))]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[validate(email)]
    pub email: Option<String>,
}
