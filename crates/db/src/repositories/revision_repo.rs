//! Repository for the `entry_revision` table.
//!
//! Revisions are append-only. Numbers run 1..N per entry with no gaps:
//! appends lock the parent entry row before computing `MAX + 1`, and
//! `uq_entry_revision_number` backs that up.

use sqlx::PgPool;
use wayside_core::types::DbId;

use crate::models::revision::{AppendRevision, EntryRevision, RevisionWithTags};
use crate::repositories::TagRepo;

/// Column list for `entry_revision` queries.
const COLUMNS: &str = "id, entry_id, title, content, revision_number, creator_id, date_created";

/// Provides append and history reads for entry revisions.
pub struct RevisionRepo;

impl RevisionRepo {
    /// Append a revision with its tags in one transaction.
    ///
    /// Returns `None` if the entry does not exist.
    pub async fn append(
        pool: &PgPool,
        entry_id: DbId,
        creator_id: DbId,
        input: &AppendRevision,
    ) -> Result<Option<RevisionWithTags>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked = sqlx::query_scalar::<_, DbId>("SELECT id FROM entry WHERE id = $1 FOR UPDATE")
            .bind(entry_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let revision =
            Self::append_inner(&mut tx, entry_id, &input.title, &input.content, creator_id).await?;
        let tags = TagRepo::attach_to_revision_inner(&mut tx, revision.id, &input.tags).await?;

        tx.commit().await?;

        Ok(Some(RevisionWithTags {
            revision,
            tags: tags.into_iter().map(Into::into).collect(),
        }))
    }

    /// Insert the next revision for `entry_id` inside the caller's transaction.
    ///
    /// The caller must hold the entry row lock (or have just inserted the
    /// entry) so that the computed number cannot be taken concurrently.
    pub async fn append_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        entry_id: DbId,
        title: &str,
        content: &str,
        creator_id: DbId,
    ) -> Result<EntryRevision, sqlx::Error> {
        let query = format!(
            "INSERT INTO entry_revision (entry_id, title, content, revision_number, creator_id) \
             SELECT $1, $2, $3, COALESCE(MAX(revision_number), 0) + 1, $4 \
             FROM entry_revision WHERE entry_id = $1 \
             RETURNING {COLUMNS}"
        );
        let revision = sqlx::query_as::<_, EntryRevision>(&query)
            .bind(entry_id)
            .bind(title.trim())
            .bind(content.trim())
            .bind(creator_id)
            .fetch_one(&mut **tx)
            .await?;

        tracing::debug!(
            entry_id,
            revision_id = revision.id,
            revision_number = revision.revision_number,
            "Revision appended",
        );
        Ok(revision)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<EntryRevision>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM entry_revision WHERE id = $1");
        sqlx::query_as::<_, EntryRevision>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The highest-numbered revision of an entry; ties go to the higher id.
    pub async fn find_current(
        pool: &PgPool,
        entry_id: DbId,
    ) -> Result<Option<EntryRevision>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM entry_revision \
             WHERE entry_id = $1 \
             ORDER BY revision_number DESC, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, EntryRevision>(&query)
            .bind(entry_id)
            .fetch_optional(pool)
            .await
    }

    /// All revisions of an entry, newest first.
    pub async fn list_by_entry(
        pool: &PgPool,
        entry_id: DbId,
    ) -> Result<Vec<EntryRevision>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM entry_revision \
             WHERE entry_id = $1 \
             ORDER BY revision_number DESC, id DESC"
        );
        sqlx::query_as::<_, EntryRevision>(&query)
            .bind(entry_id)
            .fetch_all(pool)
            .await
    }

    /// Revision history with each revision's tags, newest first.
    pub async fn list_with_tags(
        pool: &PgPool,
        entry_id: DbId,
    ) -> Result<Vec<RevisionWithTags>, sqlx::Error> {
        let revisions = Self::list_by_entry(pool, entry_id).await?;
        let ids: Vec<DbId> = revisions.iter().map(|r| r.id).collect();
        let mut tags = TagRepo::tags_for_revisions(pool, &ids).await?;

        Ok(revisions
            .into_iter()
            .map(|revision| RevisionWithTags {
                tags: tags.remove(&revision.id).unwrap_or_default(),
                revision,
            })
            .collect())
    }
}
