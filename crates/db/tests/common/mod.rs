//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use assert_matches::assert_matches;
use sqlx::PgPool;
use wayside_core::tagging::TagInput;
use wayside_core::types::DbId;
use wayside_db::models::entry::{CreateEntry, CreateEntryOutcome, CreatedEntry};
use wayside_db::models::user::CreateUser;
use wayside_db::repositories::{EntryRepo, UserRepo};

/// Meters per degree of latitude on the mean sphere.
pub const METERS_PER_DEGREE: f64 = 111_195.08;

pub async fn create_user(pool: &PgPool, username: &str) -> DbId {
    let input = CreateUser {
        username: username.to_string(),
        first_name: format!("{username}-first"),
        last_name: format!("{username}-last"),
        email: None,
    };
    UserRepo::create(pool, &input).await.unwrap().id
}

pub fn new_entry(title: &str, latitude: f64, longitude: f64, tags: Vec<TagInput>) -> CreateEntry {
    CreateEntry {
        title: title.to_string(),
        address: format!("{title} address"),
        latitude,
        longitude,
        description: format!("About {title}"),
        tags,
    }
}

/// Create an entry that is expected to succeed.
pub async fn create_entry(pool: &PgPool, creator_id: DbId, input: &CreateEntry) -> CreatedEntry {
    let outcome = EntryRepo::create(pool, creator_id, input).await.unwrap();
    assert_matches!(outcome, CreateEntryOutcome::Created(created) => created)
}

/// Latitude `meters` north of `latitude`.
pub fn north_of(latitude: f64, meters: f64) -> f64 {
    latitude + meters / METERS_PER_DEGREE
}
