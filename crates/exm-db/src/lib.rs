pub mod connection;
pub use connection::{Connection, TestHandle};

pub mod results;
pub mod schema;

pub mod groups;
pub mod members;
pub mod categories;
pub mod expenses;
pub mod state;

pub mod snapshot;
pub use snapshot::{Snapshot, SnapshotSync, SyncError};
