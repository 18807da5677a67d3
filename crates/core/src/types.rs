/// Primary keys are PostgreSQL `BIGSERIAL`.
pub type DbId = i64;

/// UTC timestamp as stored in `TIMESTAMPTZ` columns.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A distance along the Earth's surface, in meters.
pub type Meters = f64;

/// A distance in statute miles, as used by the feed's radius.
pub type Miles = f64;
