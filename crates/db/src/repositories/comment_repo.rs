//! Repository for the `conversation` table (entry comment threads).
//!
//! Threads are trees of arbitrary depth, but only one level is read per
//! call: top-level comments of an entry, or direct replies to a comment.

use sqlx::PgPool;
use wayside_core::interaction::{state_label, TargetKind};
use wayside_core::types::DbId;

use crate::models::comment::{Comment, CommentRow, CommentView, CreateComment};
use crate::repositories::{EntryRepo, InteractionRepo};

/// Column list for `conversation` queries.
const COLUMNS: &str = "id, entry_id, user_id, parent_id, context, type, created_at";

/// Select list and joins for [`CommentRow`].
const ROW_SELECT: &str = "\
    SELECT c.id, c.entry_id, c.user_id, u.username, c.parent_id, c.context, c.type, c.created_at, \
           (SELECT COUNT(*) FROM conversation r WHERE r.parent_id = c.id) AS num_of_replies \
    FROM conversation c \
    JOIN users u ON u.id = c.user_id";

/// Result of an add-comment request.
#[derive(Debug, Clone)]
pub enum AddCommentOutcome {
    Created(Comment),
    EntryNotFound,
    ParentNotFound(DbId),
    /// The parent comment belongs to a different entry.
    ParentOnOtherEntry { parent_id: DbId, parent_entry_id: DbId },
}

/// Provides comment creation and one-level thread reads.
pub struct CommentRepo;

impl CommentRepo {
    /// Add a comment to an entry, as a reply when the DTO names a parent.
    pub async fn create(
        pool: &PgPool,
        entry_id: DbId,
        user_id: DbId,
        input: &CreateComment,
    ) -> Result<AddCommentOutcome, sqlx::Error> {
        if !EntryRepo::exists(pool, entry_id).await? {
            return Ok(AddCommentOutcome::EntryNotFound);
        }

        let parent_id = input.parent();
        if let Some(parent_id) = parent_id {
            match Self::find_by_id(pool, parent_id).await? {
                None => return Ok(AddCommentOutcome::ParentNotFound(parent_id)),
                Some(parent) if parent.entry_id != entry_id => {
                    return Ok(AddCommentOutcome::ParentOnOtherEntry {
                        parent_id,
                        parent_entry_id: parent.entry_id,
                    });
                }
                Some(_) => {}
            }
        }

        let query = format!(
            "INSERT INTO conversation (entry_id, user_id, parent_id, context, type) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(entry_id)
            .bind(user_id)
            .bind(parent_id)
            .bind(input.context.trim())
            .bind(input.comment_type.trim())
            .fetch_one(pool)
            .await?;

        Ok(AddCommentOutcome::Created(comment))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM conversation WHERE id = $1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Comments on an entry that have no parent, oldest first.
    ///
    /// An unknown entry yields an empty list.
    pub async fn list_top_level(
        pool: &PgPool,
        entry_id: DbId,
        viewer: Option<DbId>,
    ) -> Result<Vec<CommentView>, sqlx::Error> {
        let query =
            format!("{ROW_SELECT} WHERE c.entry_id = $1 AND c.parent_id IS NULL ORDER BY c.id");
        let rows = sqlx::query_as::<_, CommentRow>(&query)
            .bind(entry_id)
            .fetch_all(pool)
            .await?;

        Self::decorate(pool, rows, viewer).await
    }

    /// Direct replies to a comment, oldest first.
    ///
    /// An unknown comment yields an empty list.
    pub async fn list_replies(
        pool: &PgPool,
        comment_id: DbId,
        viewer: Option<DbId>,
    ) -> Result<Vec<CommentView>, sqlx::Error> {
        let query = format!("{ROW_SELECT} WHERE c.parent_id = $1 ORDER BY c.id");
        let rows = sqlx::query_as::<_, CommentRow>(&query)
            .bind(comment_id)
            .fetch_all(pool)
            .await?;

        Self::decorate(pool, rows, viewer).await
    }

    /// Attach vote tallies and the viewer's own votes.
    async fn decorate(
        pool: &PgPool,
        rows: Vec<CommentRow>,
        viewer: Option<DbId>,
    ) -> Result<Vec<CommentView>, sqlx::Error> {
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let tallies = InteractionRepo::aggregates(pool, TargetKind::Comment, &ids).await?;
        let states = match viewer {
            Some(user_id) => {
                InteractionRepo::user_states(pool, TargetKind::Comment, user_id, &ids).await?
            }
            None => Default::default(),
        };

        Ok(rows
            .into_iter()
            .map(|comment| {
                let tally = tallies.get(&comment.id).copied().unwrap_or_default();
                let state = states.get(&comment.id).copied();
                CommentView {
                    comment,
                    upvotes: tally.upvotes,
                    downvotes: tally.downvotes,
                    user_interaction: state_label(state).to_string(),
                }
            })
            .collect())
    }
}
