//! Vote ledger vocabulary and the toggle/switch/clear state machine.
//!
//! A user holds at most one active vote per target. Repeating the same vote
//! clears it; voting the other way replaces it directly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The kind of vote a user can cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    Upvote,
    Downvote,
}

impl InteractionType {
    /// Value stored in the `interaction_type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upvote => "upvote",
            Self::Downvote => "downvote",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Upvote => Self::Downvote,
            Self::Downvote => Self::Upvote,
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(Self::Upvote),
            "downvote" => Ok(Self::Downvote),
            other => Err(CoreError::Validation(format!(
                "Invalid interaction_type '{other}'. Must be one of: upvote, downvote"
            ))),
        }
    }
}

/// Which ledger a vote belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Entry,
    Comment,
}

impl TargetKind {
    /// Entity name used in not-found errors.
    pub fn entity_name(self) -> &'static str {
        match self {
            Self::Entry => "Entry",
            Self::Comment => "Comment",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry => f.write_str("entry"),
            Self::Comment => f.write_str("comment"),
        }
    }
}

/// The write a vote request resolves to, given the user's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// No prior vote: record the requested one.
    Insert(InteractionType),
    /// Same vote repeated: remove the record.
    Clear(InteractionType),
    /// Opposite vote: replace the type in place.
    Switch {
        from: InteractionType,
        to: InteractionType,
    },
}

impl VoteTransition {
    /// The user's state once the transition has been applied.
    pub fn resulting_state(self) -> Option<InteractionType> {
        match self {
            Self::Insert(t) => Some(t),
            Self::Clear(_) => None,
            Self::Switch { to, .. } => Some(to),
        }
    }
}

/// Decide the transition for `requested` when the user currently holds `current`.
pub fn transition(current: Option<InteractionType>, requested: InteractionType) -> VoteTransition {
    match current {
        None => VoteTransition::Insert(requested),
        Some(existing) if existing == requested => VoteTransition::Clear(existing),
        Some(existing) => VoteTransition::Switch {
            from: existing,
            to: requested,
        },
    }
}

/// Serialized "your vote" value: empty when the user holds no vote.
pub fn state_label(state: Option<InteractionType>) -> &'static str {
    state.map(InteractionType::as_str).unwrap_or("")
}
