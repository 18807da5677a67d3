//! Repository for the `tags` and `tags_entry_revision` tables.
//!
//! Tags are keyed by name. Resolving an existing name overwrites its
//! classification, so the most recent writer wins.

use std::collections::HashMap;

use sqlx::PgPool;
use wayside_core::tagging::{normalize_tags, TagInput};
use wayside_core::types::DbId;

use crate::models::tag::{Tag, TagInfo};

/// Column list for `tags` queries.
const COLUMNS: &str = "id, name, classification";

/// Tag attached to some revision, used for batched lookups.
#[derive(sqlx::FromRow)]
struct RevisionTagRow {
    entry_revision_id: DbId,
    name: String,
    classification: String,
}

/// Provides get-or-create for tags and revision associations.
pub struct TagRepo;

impl TagRepo {
    /// Get or create a tag by name, overwriting its classification.
    pub async fn resolve(
        pool: &PgPool,
        name: &str,
        classification: &str,
    ) -> Result<Tag, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let tag = Self::resolve_inner(&mut tx, name, classification).await?;
        tx.commit().await?;
        Ok(tag)
    }

    /// Resolve a tag inside an existing transaction.
    ///
    /// A single upsert, so concurrent creators of the same new name never
    /// hit a duplicate-key failure.
    pub async fn resolve_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        name: &str,
        classification: &str,
    ) -> Result<Tag, sqlx::Error> {
        let query = format!(
            "INSERT INTO tags (name, classification) VALUES ($1, $2) \
             ON CONFLICT (name) DO UPDATE SET classification = EXCLUDED.classification \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(name)
            .bind(classification)
            .fetch_one(&mut **tx)
            .await
    }

    /// Resolve each tag and link it to `revision_id`.
    ///
    /// The list is normalized first (trimmed, deduplicated by name). Linking
    /// a tag that is already attached is a no-op.
    pub async fn attach_to_revision_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        revision_id: DbId,
        tags: &[TagInput],
    ) -> Result<Vec<Tag>, sqlx::Error> {
        let tags = normalize_tags(tags);
        let mut attached = Vec::with_capacity(tags.len());

        for input in &tags {
            let tag = Self::resolve_inner(tx, &input.name, &input.classification).await?;
            sqlx::query(
                "INSERT INTO tags_entry_revision (entry_revision_id, tag_id) \
                 VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(revision_id)
            .bind(tag.id)
            .execute(&mut **tx)
            .await?;
            attached.push(tag);
        }

        tracing::debug!(revision_id, count = attached.len(), "Tags attached to revision");
        Ok(attached)
    }

    /// Attach tags to an existing revision in a transaction of its own.
    pub async fn attach_to_revision(
        pool: &PgPool,
        revision_id: DbId,
        tags: &[TagInput],
    ) -> Result<Vec<Tag>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let attached = Self::attach_to_revision_inner(&mut tx, revision_id, tags).await?;
        tx.commit().await?;
        Ok(attached)
    }

    /// Every tag, ordered by name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags ORDER BY name");
        sqlx::query_as::<_, Tag>(&query).fetch_all(pool).await
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags WHERE name = $1");
        sqlx::query_as::<_, Tag>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Tags attached to one revision, ordered by name.
    pub async fn tags_for_revision(
        pool: &PgPool,
        revision_id: DbId,
    ) -> Result<Vec<TagInfo>, sqlx::Error> {
        sqlx::query_as::<_, TagInfo>(
            "SELECT t.name, t.classification \
             FROM tags t \
             JOIN tags_entry_revision ter ON ter.tag_id = t.id \
             WHERE ter.entry_revision_id = $1 \
             ORDER BY t.name",
        )
        .bind(revision_id)
        .fetch_all(pool)
        .await
    }

    /// Tags for several revisions at once, keyed by revision id.
    ///
    /// Revisions without tags are absent from the map.
    pub async fn tags_for_revisions(
        pool: &PgPool,
        revision_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<TagInfo>>, sqlx::Error> {
        if revision_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, RevisionTagRow>(
            "SELECT ter.entry_revision_id, t.name, t.classification \
             FROM tags t \
             JOIN tags_entry_revision ter ON ter.tag_id = t.id \
             WHERE ter.entry_revision_id = ANY($1) \
             ORDER BY ter.entry_revision_id, t.name",
        )
        .bind(revision_ids)
        .fetch_all(pool)
        .await?;

        let mut by_revision: HashMap<DbId, Vec<TagInfo>> = HashMap::new();
        for row in rows {
            by_revision
                .entry(row.entry_revision_id)
                .or_default()
                .push(TagInfo {
                    name: row.name,
                    classification: row.classification,
                });
        }
        Ok(by_revision)
    }
}
