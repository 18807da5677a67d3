//! Route definitions for entries, mounted at `/entries`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{comments, entries};
use crate::state::AppState;

/// ```text
/// POST   /                   -> create_entry
/// GET    /bounds             -> list_in_bounds
/// GET    /feed               -> feed
/// GET    /{id}               -> get_entry
/// GET    /{id}/revisions     -> list_revisions
/// POST   /{id}/revisions     -> append_revision
/// POST   /{id}/votes         -> vote_entry
/// GET    /{id}/comments      -> list_entry_comments
/// POST   /{id}/comments      -> add_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(entries::create_entry))
        .route("/bounds", get(entries::list_in_bounds))
        .route("/feed", get(entries::feed))
        .route("/{id}", get(entries::get_entry))
        .route(
            "/{id}/revisions",
            get(entries::list_revisions).post(entries::append_revision),
        )
        .route("/{id}/votes", post(entries::vote_entry))
        .route(
            "/{id}/comments",
            get(comments::list_entry_comments).post(comments::add_comment),
        )
}
