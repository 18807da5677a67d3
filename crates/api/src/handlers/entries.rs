//! Handlers for entries: creation, editing, retrieval, spatial reads, votes.
//!
//! Writes require [`AuthUser`]; reads accept an optional identity so the
//! response can carry the caller's own vote.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use wayside_core::entry::{validate_feed_radius, DUPLICATE_RADIUS_METERS};
use wayside_core::error::CoreError;
use wayside_core::geo::{miles_to_meters, Bounds, Coordinate};
use wayside_core::interaction::{InteractionType, TargetKind};
use wayside_core::types::DbId;
use wayside_core::validation::validate_input;
use wayside_db::models::entry::{CreateEntry, CreateEntryOutcome, FeedQuery};
use wayside_db::models::interaction::{VoteRequest, VoteResponse};
use wayside_db::models::revision::AppendRevision;
use wayside_db::repositories::{EntryRepo, InteractionRepo, RevisionRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::response::{list_or_no_content, DataResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn entry_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Entry", id })
}

/// Verify that an entry exists, returning 404 if not.
async fn ensure_entry_exists(state: &AppState, id: DbId) -> AppResult<()> {
    if EntryRepo::exists(&state.pool, id).await? {
        Ok(())
    } else {
        Err(entry_not_found(id))
    }
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /api/v1/entries
///
/// Create an entry with its first revision. Returns 409 if another entry
/// already lies within the duplicate radius.
pub async fn create_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateEntry>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    Coordinate::new(input.latitude, input.longitude)?;

    match EntryRepo::create(&state.pool, auth.user_id, &input).await? {
        CreateEntryOutcome::Created(created) => {
            tracing::info!(
                entry_id = created.entry_id,
                revision_id = created.revision_id,
                user_id = auth.user_id,
                "Entry created",
            );
            Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
        }
        CreateEntryOutcome::LocationTaken { existing_entry_id } => {
            Err(AppError::Core(CoreError::Conflict(format!(
                "Entry {existing_entry_id} already exists within {DUPLICATE_RADIUS_METERS} meters of this location"
            ))))
        }
    }
}

/// POST /api/v1/entries/{id}/revisions
///
/// Edit an entry by appending a new revision with its tags.
pub async fn append_revision(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
    Json(input): Json<AppendRevision>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;

    let appended = RevisionRepo::append(&state.pool, entry_id, auth.user_id, &input)
        .await?
        .ok_or_else(|| entry_not_found(entry_id))?;

    tracing::info!(
        entry_id,
        revision_id = appended.revision.id,
        revision_number = appended.revision.revision_number,
        user_id = auth.user_id,
        "Entry revision appended",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: appended })))
}

/// POST /api/v1/entries/{id}/votes
///
/// Cast, switch or clear the caller's vote on an entry.
pub async fn vote_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
    Json(input): Json<VoteRequest>,
) -> AppResult<impl IntoResponse> {
    let requested: InteractionType = input.interaction_type.parse()?;

    let result =
        InteractionRepo::vote(&state.pool, TargetKind::Entry, entry_id, auth.user_id, requested)
            .await?
            .ok_or_else(|| entry_not_found(entry_id))?;

    tracing::info!(
        entry_id,
        user_id = auth.user_id,
        target_kind = %TargetKind::Entry,
        transition = ?result.transition,
        "Entry vote recorded",
    );

    Ok(Json(DataResponse {
        data: VoteResponse::from(result),
    }))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/entries/{id}
///
/// Entry with its current revision, tags, vote tally and the caller's vote.
pub async fn get_entry(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail = EntryRepo::find_detail(&state.pool, entry_id, viewer.user_id())
        .await?
        .ok_or_else(|| entry_not_found(entry_id))?;

    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/entries/{id}/revisions
///
/// Full revision history, newest first.
pub async fn list_revisions(
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_entry_exists(&state, entry_id).await?;

    let history = RevisionRepo::list_with_tags(&state.pool, entry_id).await?;

    Ok(Json(DataResponse { data: history }))
}

/// GET /api/v1/entries/bounds?north=..&south=..&east=..&west=..
///
/// Entries inside a bounding box. 204 when the box is empty.
pub async fn list_in_bounds(
    State(state): State<AppState>,
    Query(bounds): Query<Bounds>,
) -> AppResult<Response> {
    bounds.validate()?;

    let entries = EntryRepo::list_in_bounds(&state.pool, &bounds).await?;

    Ok(list_or_no_content(entries))
}

/// GET /api/v1/entries/feed?city=..&distance=..
///
/// Entries within `distance` miles of a named city, newest first. 404 for an
/// unknown city, 204 when nothing is in range.
pub async fn feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Response> {
    validate_feed_radius(query.distance)?;

    let city = state
        .cities
        .find_exact(&query.city)
        .ok_or_else(|| AppError::Core(CoreError::UnknownCity(query.city.clone())))?;

    let entries =
        EntryRepo::list_near(&state.pool, city.coordinate(), miles_to_meters(query.distance))
            .await?;

    tracing::debug!(
        city = %city.name,
        distance = query.distance,
        count = entries.len(),
        "Feed built",
    );

    Ok(list_or_no_content(entries))
}
