//! Handlers for comment threads and comment votes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use wayside_core::error::CoreError;
use wayside_core::interaction::{InteractionType, TargetKind};
use wayside_core::types::DbId;
use wayside_core::validation::validate_input;
use wayside_db::models::comment::{Comment, CreateComment};
use wayside_db::models::interaction::{VoteRequest, VoteResponse};
use wayside_db::repositories::{AddCommentOutcome, CommentRepo, InteractionRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::response::DataResponse;
use crate::state::AppState;

/// A freshly added comment with its author's name.
#[derive(Debug, Serialize)]
pub struct PostedComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub username: String,
}

/// POST /api/v1/entries/{id}/comments
///
/// Add a top-level comment, or a reply when `parent_id` names a comment on
/// the same entry.
pub async fn add_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
    Json(input): Json<CreateComment>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;

    let comment = match CommentRepo::create(&state.pool, entry_id, auth.user_id, &input).await? {
        AddCommentOutcome::Created(comment) => comment,
        AddCommentOutcome::EntryNotFound => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Entry",
                id: entry_id,
            }));
        }
        AddCommentOutcome::ParentNotFound(parent_id) => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Comment",
                id: parent_id,
            }));
        }
        AddCommentOutcome::ParentOnOtherEntry {
            parent_id,
            parent_entry_id,
        } => {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Comment {parent_id} belongs to entry {parent_entry_id}, not entry {entry_id}"
            ))));
        }
    };

    tracing::info!(
        comment_id = comment.id,
        entry_id,
        parent_id = ?comment.parent_id,
        user_id = auth.user_id,
        "Comment added",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: PostedComment {
                comment,
                username: auth.username,
            },
        }),
    ))
}

/// GET /api/v1/entries/{id}/comments
///
/// Top-level comments of an entry. An unknown entry yields an empty list.
pub async fn list_entry_comments(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let comments = CommentRepo::list_top_level(&state.pool, entry_id, viewer.user_id()).await?;

    Ok(Json(DataResponse { data: comments }))
}

/// GET /api/v1/comments/{id}/replies
///
/// Direct replies to a comment. An unknown comment yields an empty list.
pub async fn list_replies(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let replies = CommentRepo::list_replies(&state.pool, comment_id, viewer.user_id()).await?;

    Ok(Json(DataResponse { data: replies }))
}

/// POST /api/v1/comments/{id}/votes
///
/// Cast, switch or clear the caller's vote on a comment.
pub async fn vote_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<DbId>,
    Json(input): Json<VoteRequest>,
) -> AppResult<impl IntoResponse> {
    let requested: InteractionType = input.interaction_type.parse()?;

    let result = InteractionRepo::vote(
        &state.pool,
        TargetKind::Comment,
        comment_id,
        auth.user_id,
        requested,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: TargetKind::Comment.entity_name(),
        id: comment_id,
    }))?;

    tracing::info!(
        comment_id,
        user_id = auth.user_id,
        target_kind = %TargetKind::Comment,
        transition = ?result.transition,
        "Comment vote recorded",
    );

    Ok(Json(DataResponse {
        data: VoteResponse::from(result),
    }))
}
