//! Tag registry models.

use serde::Serialize;
use sqlx::FromRow;
use wayside_core::types::DbId;

/// A row from the `tags` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tag {
    pub id: DbId,
    pub name: String,
    pub classification: String,
}

/// Tag as shown on a revision.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct TagInfo {
    pub name: String,
    pub classification: String,
}

impl From<Tag> for TagInfo {
    fn from(tag: Tag) -> Self {
        Self {
            name: tag.name,
            classification: tag.classification,
        }
    }
}
