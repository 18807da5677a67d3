pub mod cities;
pub mod comments;
pub mod entries;
pub mod health;
pub mod tags;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /entries                              create (POST)
/// /entries/bounds                       entries in a bounding box (GET)
/// /entries/feed                         entries near a city (GET)
/// /entries/{id}                         entry detail (GET)
/// /entries/{id}/revisions               history (GET), edit (POST)
/// /entries/{id}/votes                   vote on entry (POST)
/// /entries/{id}/comments                top-level comments (GET), add (POST)
///
/// /comments/{id}/replies                direct replies (GET)
/// /comments/{id}/votes                  vote on comment (POST)
///
/// /tags                                 all tags (GET)
/// /cities                               fuzzy city search (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/entries", entries::router())
        .nest("/comments", comments::router())
        .nest("/tags", tags::router())
        .nest("/cities", cities::router())
}
