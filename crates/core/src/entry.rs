//! Entry-store constants and feed parameter checks.

use crate::error::CoreError;
use crate::types::{Meters, Miles};

/// No two entries may lie within this many meters of each other.
pub const DUPLICATE_RADIUS_METERS: Meters = 50.0;

/// PostgreSQL advisory lock ID held while checking proximity and inserting a
/// new entry. Serializes concurrent creators so the check cannot go stale.
pub const ENTRY_CREATE_LOCK_ID: i64 = 574_302_118;

/// Largest feed radius accepted, in miles.
pub const MAX_FEED_RADIUS_MILES: Miles = 500.0;

/// Validate a feed radius in miles.
pub fn validate_feed_radius(miles: Miles) -> Result<(), CoreError> {
    if !miles.is_finite() || miles <= 0.0 {
        return Err(CoreError::Validation(format!(
            "distance must be a positive number of miles, got {miles}"
        )));
    }
    if miles > MAX_FEED_RADIUS_MILES {
        return Err(CoreError::Validation(format!(
            "distance must not exceed {MAX_FEED_RADIUS_MILES} miles"
        )));
    }
    Ok(())
}
