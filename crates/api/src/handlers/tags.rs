//! Handlers for the tag registry.

use axum::extract::State;
use axum::response::Response;
use wayside_db::repositories::TagRepo;

use crate::error::AppResult;
use crate::response::list_or_no_content;
use crate::state::AppState;

/// GET /api/v1/tags
///
/// Every known tag ordered by name. 204 when none exist yet.
pub async fn list_tags(State(state): State<AppState>) -> AppResult<Response> {
    let tags = TagRepo::list_all(&state.pool).await?;

    Ok(list_or_no_content(tags))
}
