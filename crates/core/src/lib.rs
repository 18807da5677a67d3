//! Domain logic for the wayside content engine.
//!
//! Nothing here touches the database: the `wayside-db` crate persists what
//! these types describe, and `wayside-api` maps [`error::CoreError`] to HTTP.

pub mod cities;
pub mod entry;
pub mod error;
pub mod geo;
pub mod interaction;
pub mod tagging;
pub mod types;
pub mod validation;
