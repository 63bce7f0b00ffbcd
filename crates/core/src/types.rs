/// Catalog primary keys (`recordings.id`, `frames.id`) are PostgreSQL integers.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
