//! Ascend Persistence - SQLite database, local scalar store, and offline account store

pub mod local;
pub mod sqlite;

pub use local::LocalAccountStore;
pub use sqlite::{Database, SqliteScalarStore};
