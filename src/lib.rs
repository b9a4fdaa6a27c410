//! Reversible table snapshots for tests that exercise a real database.
//!
//! A [`Snapshotter`] copies each tracked table to `table + suffix` before a
//! destructive run and restores it afterwards, dropping the copies.

pub mod adapters;
pub mod config;
pub mod error;
pub mod logging;
pub mod registry;
pub mod snapshot;

pub use adapters::DatabaseAdapter;
pub use config::ConnectionStrings;
pub use error::{ReversionError, Result, SqlError};
pub use snapshot::{SnapshotOptions, SnapshotState, Snapshotter, SnapshotterBuilder};
