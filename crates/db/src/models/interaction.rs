//! Vote ledger models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wayside_core::interaction::{state_label, InteractionType, VoteTransition};

/// Upvote and downvote counts for one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow, Serialize)]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
}

/// What a vote request did and where the target stands afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteResult {
    pub transition: VoteTransition,
    pub tally: VoteTally,
    /// The caller's vote as re-read after the write.
    pub state: Option<InteractionType>,
}

/// DTO for casting a vote on an entry or comment.
#[derive(Debug, Clone, Deserialize)]
pub struct VoteRequest {
    pub interaction_type: String,
}

/// Response body for a vote.
#[derive(Debug, Clone, Serialize)]
pub struct VoteResponse {
    pub upvotes: i64,
    pub downvotes: i64,
    pub user_interaction: String,
}

impl From<VoteResult> for VoteResponse {
    fn from(result: VoteResult) -> Self {
        Self {
            upvotes: result.tally.upvotes,
            downvotes: result.tally.downvotes,
            user_interaction: state_label(result.state).to_string(),
        }
    }
}
