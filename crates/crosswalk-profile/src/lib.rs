//! Profile store client.
//!
//! The profile store is queried two ways during validation: a chunked batch
//! "IN" query that amortizes round-trips for the common case (the record
//! exists), and an individual fallback fetch for identifiers the batch did
//! not return (typically orphans). Batch chunk failures are swallowed here;
//! absence from the batch result is what triggers the fallback path.

pub mod client;
pub mod error;
pub mod models;

pub use client::ProfileClient;
pub use error::{ProfileError, ProfileResult};
pub use models::ProfileRecord;
