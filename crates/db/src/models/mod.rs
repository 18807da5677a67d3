//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` + `Serialize` structs matching database rows or joined views
//! - `Deserialize` + `Validate` request DTOs for inserts

pub mod comment;
pub mod entry;
pub mod interaction;
pub mod revision;
pub mod tag;
pub mod user;
