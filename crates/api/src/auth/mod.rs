//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token validation (and issuance for test tooling).

pub mod jwt;
