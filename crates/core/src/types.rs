/// Backend primary keys are integer ids.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifier of an editor item, e.g. `"item3"`.
pub type ItemId = String;
