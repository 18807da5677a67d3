//! Route definitions for comments, mounted at `/comments`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::comments;
use crate::state::AppState;

/// ```text
/// GET    /{id}/replies       -> list_replies
/// POST   /{id}/votes         -> vote_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/replies", get(comments::list_replies))
        .route("/{id}/votes", post(comments::vote_comment))
}
