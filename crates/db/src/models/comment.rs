//! Comment thread models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use wayside_core::types::{DbId, Timestamp};

/// A row from the `conversation` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub entry_id: DbId,
    pub user_id: DbId,
    pub parent_id: Option<DbId>,
    pub context: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub comment_type: String,
    pub created_at: Timestamp,
}

/// A comment row with author name and reply count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentRow {
    pub id: DbId,
    pub entry_id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub parent_id: Option<DbId>,
    pub context: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub comment_type: String,
    pub created_at: Timestamp,
    pub num_of_replies: i64,
}

/// A listed comment decorated with its vote tally and the viewer's vote.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: CommentRow,
    pub upvotes: i64,
    pub downvotes: i64,
    pub user_interaction: String,
}

/// DTO for adding a comment to an entry.
///
/// A `parent_id` of zero or null posts a top-level comment. A missing `type`
/// deserializes as empty and fails validation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateComment {
    #[serde(default)]
    pub parent_id: Option<DbId>,
    #[validate(custom(function = "wayside_core::validation::non_blank"))]
    pub context: String,
    #[serde(default, rename = "type", alias = "classification")]
    #[validate(custom(function = "wayside_core::validation::non_blank"))]
    pub comment_type: String,
}

impl CreateComment {
    /// Parent id with the zero sentinel folded into `None`.
    pub fn parent(&self) -> Option<DbId> {
        self.parent_id.filter(|&id| id > 0)
    }
}
