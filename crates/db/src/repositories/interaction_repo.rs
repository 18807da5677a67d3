//! Repository for the vote ledgers: `entry_interactions` and
//! `conversation_interactions`.
//!
//! Both tables share one shape, keyed by `(target, user_id)`. Each
//! [`TargetKind`] is bound to a fixed set of statements generated at compile
//! time, so no SQL identifier is ever formatted from runtime input.

use std::collections::HashMap;

use sqlx::PgPool;
use wayside_core::interaction::{transition, InteractionType, TargetKind, VoteTransition};
use wayside_core::types::DbId;

use crate::models::interaction::{VoteResult, VoteTally};

/// Statements for one ledger table.
struct LedgerQueries {
    target_exists: &'static str,
    upsert: &'static str,
    delete: &'static str,
    user_state: &'static str,
    user_states: &'static str,
    aggregate: &'static str,
    aggregates: &'static str,
}

macro_rules! ledger_queries {
    ($ledger:literal, $target_col:literal, $target_table:literal) => {
        LedgerQueries {
            target_exists: concat!(
                "SELECT EXISTS(SELECT 1 FROM ",
                $target_table,
                " WHERE id = $1)"
            ),
            // Inserts a first vote or switches an opposite one. A repeated
            // vote matches the conflict row but fails the WHERE, returning
            // nothing while still locking the row.
            upsert: concat!(
                "INSERT INTO ",
                $ledger,
                " (",
                $target_col,
                ", user_id, interaction_type) VALUES ($1, $2, $3) ON CONFLICT (",
                $target_col,
                ", user_id) DO UPDATE SET interaction_type = EXCLUDED.interaction_type, \
                 created_at = NOW() WHERE ",
                $ledger,
                ".interaction_type <> EXCLUDED.interaction_type RETURNING (xmax = 0) AS inserted"
            ),
            delete: concat!(
                "DELETE FROM ",
                $ledger,
                " WHERE ",
                $target_col,
                " = $1 AND user_id = $2 AND interaction_type = $3"
            ),
            user_state: concat!(
                "SELECT interaction_type FROM ",
                $ledger,
                " WHERE ",
                $target_col,
                " = $1 AND user_id = $2"
            ),
            user_states: concat!(
                "SELECT ",
                $target_col,
                " AS target_id, interaction_type FROM ",
                $ledger,
                " WHERE user_id = $1 AND ",
                $target_col,
                " = ANY($2)"
            ),
            aggregate: concat!(
                "SELECT \
                 COUNT(*) FILTER (WHERE interaction_type = 'upvote') AS upvotes, \
                 COUNT(*) FILTER (WHERE interaction_type = 'downvote') AS downvotes \
                 FROM ",
                $ledger,
                " WHERE ",
                $target_col,
                " = $1"
            ),
            aggregates: concat!(
                "SELECT ",
                $target_col,
                " AS target_id, \
                 COUNT(*) FILTER (WHERE interaction_type = 'upvote') AS upvotes, \
                 COUNT(*) FILTER (WHERE interaction_type = 'downvote') AS downvotes \
                 FROM ",
                $ledger,
                " WHERE ",
                $target_col,
                " = ANY($1) GROUP BY ",
                $target_col
            ),
        }
    };
}

static ENTRY_LEDGER: LedgerQueries = ledger_queries!("entry_interactions", "entry_id", "entry");

static COMMENT_LEDGER: LedgerQueries =
    ledger_queries!("conversation_interactions", "conversation_id", "conversation");

fn ledger(kind: TargetKind) -> &'static LedgerQueries {
    match kind {
        TargetKind::Entry => &ENTRY_LEDGER,
        TargetKind::Comment => &COMMENT_LEDGER,
    }
}

#[derive(sqlx::FromRow)]
struct TallyRow {
    target_id: DbId,
    upvotes: i64,
    downvotes: i64,
}

#[derive(sqlx::FromRow)]
struct StateRow {
    target_id: DbId,
    interaction_type: String,
}

/// Decode a stored `interaction_type` value.
fn parse_state(value: &str) -> Result<InteractionType, sqlx::Error> {
    value
        .parse::<InteractionType>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// Provides the vote state machine and tallies for both target kinds.
pub struct InteractionRepo;

impl InteractionRepo {
    /// Apply a vote request from `user_id` on a target.
    ///
    /// No prior vote inserts one, the same vote again clears it, and the
    /// opposite vote replaces it. The caller's resulting state and the tally
    /// are re-read before commit. Returns `None` if the target does not exist.
    pub async fn vote(
        pool: &PgPool,
        kind: TargetKind,
        target_id: DbId,
        user_id: DbId,
        requested: InteractionType,
    ) -> Result<Option<VoteResult>, sqlx::Error> {
        let queries = ledger(kind);
        let mut tx = pool.begin().await?;

        let exists = sqlx::query_scalar::<_, bool>(queries.target_exists)
            .bind(target_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Ok(None);
        }

        let inserted = sqlx::query_scalar::<_, bool>(queries.upsert)
            .bind(target_id)
            .bind(user_id)
            .bind(requested.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let previous = match inserted {
            Some(true) => None,
            Some(false) => Some(requested.opposite()),
            None => Some(requested),
        };
        let applied = transition(previous, requested);

        if let VoteTransition::Clear(cleared) = applied {
            sqlx::query(queries.delete)
                .bind(target_id)
                .bind(user_id)
                .bind(cleared.as_str())
                .execute(&mut *tx)
                .await?;
        }

        let state = sqlx::query_scalar::<_, String>(queries.user_state)
            .bind(target_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .as_deref()
            .map(parse_state)
            .transpose()?;

        let tally = sqlx::query_as::<_, VoteTally>(queries.aggregate)
            .bind(target_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            target_kind = %kind,
            target_id,
            user_id,
            transition = ?applied,
            "Vote applied",
        );

        Ok(Some(VoteResult {
            transition: applied,
            tally,
            state,
        }))
    }

    /// Upvote and downvote counts for one target.
    pub async fn aggregate(
        pool: &PgPool,
        kind: TargetKind,
        target_id: DbId,
    ) -> Result<VoteTally, sqlx::Error> {
        sqlx::query_as::<_, VoteTally>(ledger(kind).aggregate)
            .bind(target_id)
            .fetch_one(pool)
            .await
    }

    /// Tallies for several targets. Targets without votes are absent.
    pub async fn aggregates(
        pool: &PgPool,
        kind: TargetKind,
        target_ids: &[DbId],
    ) -> Result<HashMap<DbId, VoteTally>, sqlx::Error> {
        if target_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, TallyRow>(ledger(kind).aggregates)
            .bind(target_ids)
            .fetch_all(pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.target_id,
                    VoteTally {
                        upvotes: row.upvotes,
                        downvotes: row.downvotes,
                    },
                )
            })
            .collect())
    }

    /// The user's current vote on a target, if any.
    pub async fn user_state(
        pool: &PgPool,
        kind: TargetKind,
        target_id: DbId,
        user_id: DbId,
    ) -> Result<Option<InteractionType>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(ledger(kind).user_state)
            .bind(target_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .as_deref()
            .map(parse_state)
            .transpose()
    }

    /// The user's votes on several targets. Targets without a vote are absent.
    pub async fn user_states(
        pool: &PgPool,
        kind: TargetKind,
        user_id: DbId,
        target_ids: &[DbId],
    ) -> Result<HashMap<DbId, InteractionType>, sqlx::Error> {
        if target_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, StateRow>(ledger(kind).user_states)
            .bind(user_id)
            .bind(target_ids)
            .fetch_all(pool)
            .await?;

        rows.into_iter()
            .map(|row| Ok((row.target_id, parse_state(&row.interaction_type)?)))
            .collect()
    }
}
