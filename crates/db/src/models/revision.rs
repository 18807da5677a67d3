//! Entry revision models.
//!
//! Revisions are immutable snapshots; editing an entry appends a new one.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use wayside_core::tagging::TagInput;
use wayside_core::types::{DbId, Timestamp};

use crate::models::tag::TagInfo;

/// A row from the `entry_revision` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EntryRevision {
    pub id: DbId,
    pub entry_id: DbId,
    pub title: String,
    pub content: String,
    pub revision_number: i32,
    pub creator_id: DbId,
    pub date_created: Timestamp,
}

/// A revision together with the tags attached to it.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionWithTags {
    #[serde(flatten)]
    pub revision: EntryRevision,
    pub tags: Vec<TagInfo>,
}

/// DTO for editing an entry, which appends a revision.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AppendRevision {
    #[serde(alias = "newTitle")]
    #[validate(custom(function = "wayside_core::validation::non_blank"))]
    pub title: String,
    #[serde(alias = "newContent")]
    #[validate(custom(function = "wayside_core::validation::non_blank"))]
    pub content: String,
    #[serde(default, alias = "newTags")]
    #[validate(nested)]
    pub tags: Vec<TagInput>,
}
