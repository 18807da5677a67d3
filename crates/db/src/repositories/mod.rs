//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Multi-statement writes open their own
//! transaction; `_inner` helpers take the caller's transaction instead.

pub mod comment_repo;
pub mod entry_repo;
pub mod interaction_repo;
pub mod revision_repo;
pub mod tag_repo;
pub mod user_repo;

pub use comment_repo::{AddCommentOutcome, CommentRepo};
pub use entry_repo::EntryRepo;
pub use interaction_repo::InteractionRepo;
pub use revision_repo::RevisionRepo;
pub use tag_repo::TagRepo;
pub use user_repo::UserRepo;
