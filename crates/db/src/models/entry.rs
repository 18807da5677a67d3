//! Entry models: listing and detail views plus the create DTO.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use wayside_core::geo::Coordinate;
use wayside_core::tagging::TagInput;
use wayside_core::types::{DbId, Timestamp};

use crate::models::tag::TagInfo;

/// An entry joined with its current revision and creator, as listed by
/// bounds and feed queries.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EntrySummary {
    pub id: DbId,
    pub title: String,
    pub address: String,
    pub content: String,
    pub views: i32,
    pub date_created: Timestamp,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub number_of_comments: i64,
    #[sqlx(default)]
    pub upvotes: i64,
    #[sqlx(default)]
    pub downvotes: i64,
}

/// Entry columns plus its current revision, as loaded for a single entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EntryDetailRow {
    pub id: DbId,
    pub title: String,
    pub address: String,
    pub content: String,
    pub revision_id: DbId,
    pub revision_number: i32,
    pub views: i32,
    pub date_created: Timestamp,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub number_of_comments: i64,
}

/// Full entry view: current revision, its tags, the vote tally and the
/// viewer's own vote (empty when none).
#[derive(Debug, Clone, Serialize)]
pub struct EntryDetail {
    #[serde(flatten)]
    pub entry: EntryDetailRow,
    pub tags: Vec<TagInfo>,
    pub upvotes: i64,
    pub downvotes: i64,
    pub user_interaction: String,
}

/// DTO for creating an entry together with its first revision.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEntry {
    #[validate(custom(function = "wayside_core::validation::non_blank"))]
    pub title: String,
    #[serde(alias = "location")]
    #[validate(custom(function = "wayside_core::validation::non_blank"))]
    pub address: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(custom(function = "wayside_core::validation::non_blank"))]
    pub description: String,
    #[serde(default)]
    #[validate(nested)]
    pub tags: Vec<TagInput>,
}

impl CreateEntry {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Ids of the rows written by a successful create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreatedEntry {
    pub entry_id: DbId,
    pub revision_id: DbId,
}

/// Result of a create request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateEntryOutcome {
    Created(CreatedEntry),
    /// Another entry already sits within the duplicate radius.
    LocationTaken { existing_entry_id: DbId },
}

/// Query parameters for the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedQuery {
    /// Exact city name from the city directory.
    #[serde(alias = "location")]
    pub city: String,
    /// Radius in miles.
    pub distance: f64,
}
