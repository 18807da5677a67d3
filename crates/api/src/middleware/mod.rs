//! Request extractors.
//!
//! - [`auth::AuthUser`] -- Requires a valid access token naming a known user.
//! - [`auth::MaybeAuthUser`] -- Optional identity for personalised reads.

pub mod auth;
