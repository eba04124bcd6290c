//! Durable storage for fragment pixels and fragment records

/// Directory-backed fragment pixel storage
pub mod fragments;
/// Record shapes shared by every store
pub mod record;
/// Record store trait and its `SQLite` implementation
pub mod store;
/// Output directory bundling store and storage
pub mod workspace;

pub use fragments::{FragmentStorage, StorageReference};
pub use record::{FragmentRecord, NewRecord};
pub use store::{RecordStore, SqliteStore};
pub use workspace::Workspace;
