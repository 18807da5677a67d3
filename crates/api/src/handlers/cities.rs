//! Handlers for fuzzy city lookup.

use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::list_or_no_content;
use crate::state::AppState;

/// Query parameters for `GET /cities`.
#[derive(Debug, Deserialize)]
pub struct CitySearchParams {
    #[serde(default, alias = "city")]
    pub query: String,
}

/// GET /api/v1/cities?query=..
///
/// Up to three best matches for a partial city name. 204 when nothing matches.
pub async fn search_cities(
    State(state): State<AppState>,
    Query(params): Query<CitySearchParams>,
) -> AppResult<Response> {
    if params.query.trim().is_empty() {
        return Err(AppError::BadRequest("query must not be empty".into()));
    }

    let matches: Vec<_> = state
        .cities
        .search(&params.query)
        .into_iter()
        .cloned()
        .collect();

    Ok(list_or_no_content(matches))
}
