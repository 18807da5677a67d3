//! Repository for the `entry` table.
//!
//! Creation is spatially deduplicated: no two entries may sit within
//! [`DUPLICATE_RADIUS_METERS`] of each other. The proximity check and the
//! insert run under a transaction-scoped advisory lock so concurrent
//! creators cannot both pass the check.

use sqlx::PgPool;
use wayside_core::entry::{DUPLICATE_RADIUS_METERS, ENTRY_CREATE_LOCK_ID};
use wayside_core::geo::{Bounds, Coordinate};
use wayside_core::interaction::{state_label, TargetKind};
use wayside_core::types::{DbId, Meters};

use crate::models::entry::{
    CreateEntry, CreateEntryOutcome, CreatedEntry, EntryDetail, EntryDetailRow,
    EntrySummary,
};
use crate::repositories::{InteractionRepo, RevisionRepo, TagRepo};

/// Entry, creator and current revision joined for listing and detail views.
///
/// `r` is the highest-numbered revision; ties go to the higher id.
const CURRENT_REVISION_FROM: &str = "\
    FROM entry e \
    JOIN users u ON u.id = e.creator_id \
    JOIN LATERAL ( \
        SELECT id, title, content, revision_number FROM entry_revision \
        WHERE entry_id = e.id \
        ORDER BY revision_number DESC, id DESC \
        LIMIT 1 \
    ) r ON TRUE";

/// Select list for [`EntrySummary`].
const SUMMARY_COLUMNS: &str = "\
    e.id, r.title, e.address, r.content, e.views, e.date_created, \
    u.username, u.first_name, u.last_name, e.latitude, e.longitude, \
    (SELECT COUNT(*) FROM conversation c WHERE c.entry_id = e.id) AS number_of_comments";

/// Bounding-box predicate over `e`. Parameters, in order: south, north,
/// west, east. A box with `west > east` wraps across the antimeridian.
macro_rules! in_bounds_predicate {
    ($south:literal, $north:literal, $west:literal, $east:literal) => {
        concat!(
            "e.latitude BETWEEN ", $south, " AND ", $north, " AND ( \
             (", $west, "::float8 <= ", $east, "::float8 AND e.longitude BETWEEN ", $west, " AND ", $east, ") \
             OR (", $west, "::float8 > ", $east, "::float8 AND (e.longitude >= ", $west, " OR e.longitude <= ", $east, ")))"
        )
    };
}

/// Provides creation, lookup and spatial listing for entries.
pub struct EntryRepo;

impl EntryRepo {
    /// Create an entry with revision 1 and its tags, unless another entry
    /// already lies within the duplicate radius.
    ///
    /// Either the entry, its first revision and all tag links are written,
    /// or nothing is.
    pub async fn create(
        pool: &PgPool,
        creator_id: DbId,
        input: &CreateEntry,
    ) -> Result<CreateEntryOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ENTRY_CREATE_LOCK_ID)
            .execute(&mut *tx)
            .await?;

        if let Some(existing_entry_id) =
            Self::find_nearby_inner(&mut tx, input.coordinate(), DUPLICATE_RADIUS_METERS).await?
        {
            tracing::debug!(existing_entry_id, "Entry location already taken");
            return Ok(CreateEntryOutcome::LocationTaken { existing_entry_id });
        }

        let entry_id = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO entry (address, creator_id, latitude, longitude) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(input.address.trim())
        .bind(creator_id)
        .bind(input.latitude)
        .bind(input.longitude)
        .fetch_one(&mut *tx)
        .await?;

        let revision = RevisionRepo::append_inner(
            &mut tx,
            entry_id,
            &input.title,
            &input.description,
            creator_id,
        )
        .await?;
        TagRepo::attach_to_revision_inner(&mut tx, revision.id, &input.tags).await?;

        tx.commit().await?;

        Ok(CreateEntryOutcome::Created(CreatedEntry {
            entry_id,
            revision_id: revision.id,
        }))
    }

    /// Nearest entry within `radius_meters` of `center`, if any.
    async fn find_nearby_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        center: Coordinate,
        radius_meters: Meters,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let bounds = Bounds::around(center, radius_meters);
        sqlx::query_scalar::<_, DbId>(concat!(
            "SELECT e.id FROM entry e WHERE ",
            in_bounds_predicate!("$3", "$4", "$5", "$6"),
            " AND great_circle_meters($1, $2, e.latitude, e.longitude) <= $7 \
             ORDER BY great_circle_meters($1, $2, e.latitude, e.longitude), e.id \
             LIMIT 1"
        ))
        .bind(center.latitude)
        .bind(center.longitude)
        .bind(bounds.south)
        .bind(bounds.north)
        .bind(bounds.west)
        .bind(bounds.east)
        .bind(radius_meters)
        .fetch_optional(&mut **tx)
        .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM entry WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Load an entry with its current revision, that revision's tags, the
    /// vote tally and `viewer`'s own vote.
    ///
    /// Returns `None` if the entry does not exist.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
        viewer: Option<DbId>,
    ) -> Result<Option<EntryDetail>, sqlx::Error> {
        let query = format!(
            "SELECT e.id, r.title, e.address, r.content, \
                    r.id AS revision_id, r.revision_number, e.views, e.date_created, \
                    u.username, u.first_name, u.last_name, e.latitude, e.longitude, \
                    (SELECT COUNT(*) FROM conversation c WHERE c.entry_id = e.id) AS number_of_comments \
             {CURRENT_REVISION_FROM} \
             WHERE e.id = $1"
        );
        let Some(entry) = sqlx::query_as::<_, EntryDetailRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let tags = TagRepo::tags_for_revision(pool, entry.revision_id).await?;
        let tally = InteractionRepo::aggregate(pool, TargetKind::Entry, id).await?;
        let state = match viewer {
            Some(user_id) => {
                InteractionRepo::user_state(pool, TargetKind::Entry, id, user_id).await?
            }
            None => None,
        };

        Ok(Some(EntryDetail {
            entry,
            tags,
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
            user_interaction: state_label(state).to_string(),
        }))
    }

    /// Entries whose location falls inside `bounds`, ordered by id.
    pub async fn list_in_bounds(
        pool: &PgPool,
        bounds: &Bounds,
    ) -> Result<Vec<EntrySummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} {CURRENT_REVISION_FROM} WHERE {} ORDER BY e.id",
            in_bounds_predicate!("$1", "$2", "$3", "$4"),
        );
        let entries = sqlx::query_as::<_, EntrySummary>(&query)
            .bind(bounds.south)
            .bind(bounds.north)
            .bind(bounds.west)
            .bind(bounds.east)
            .fetch_all(pool)
            .await?;

        Self::with_tallies(pool, entries).await
    }

    /// Entries within `radius_meters` of `center`, newest first.
    pub async fn list_near(
        pool: &PgPool,
        center: Coordinate,
        radius_meters: Meters,
    ) -> Result<Vec<EntrySummary>, sqlx::Error> {
        let prefilter = Bounds::around(center, radius_meters);
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} {CURRENT_REVISION_FROM} \
             WHERE {} AND great_circle_meters($1, $2, e.latitude, e.longitude) <= $7 \
             ORDER BY e.date_created DESC, e.id DESC",
            in_bounds_predicate!("$3", "$4", "$5", "$6"),
        );
        let entries = sqlx::query_as::<_, EntrySummary>(&query)
            .bind(center.latitude)
            .bind(center.longitude)
            .bind(prefilter.south)
            .bind(prefilter.north)
            .bind(prefilter.west)
            .bind(prefilter.east)
            .bind(radius_meters)
            .fetch_all(pool)
            .await?;

        Self::with_tallies(pool, entries).await
    }

    /// Fill in vote counts for listed entries.
    async fn with_tallies(
        pool: &PgPool,
        mut entries: Vec<EntrySummary>,
    ) -> Result<Vec<EntrySummary>, sqlx::Error> {
        let ids: Vec<DbId> = entries.iter().map(|e| e.id).collect();
        let tallies = InteractionRepo::aggregates(pool, TargetKind::Entry, &ids).await?;

        for entry in &mut entries {
            if let Some(tally) = tallies.get(&entry.id) {
                entry.upvotes = tally.upvotes;
                entry.downvotes = tally.downvotes;
            }
        }
        Ok(entries)
    }
}
