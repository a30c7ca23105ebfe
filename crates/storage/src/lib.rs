//! Storage - result persistence and the unresolved-domains file
//!
//! Probe results are upserted into SQLite through `sqlx`; domains that fail
//! resolution are appended to a plain text file, one per line.

mod sqlite;
mod unresolved;

pub use sqlite::{SqliteStore, StoredHost, DEFAULT_DATABASE_URL};
pub use unresolved::{UnresolvedFile, DEFAULT_UNRESOLVED_FILE};
