//! Snapshot persistence for resumable sessions
//!
//! Features:
//! - Versioned JSON envelope tagged with the game kind
//! - Structural validation on decode
//! - Write to tmp then rename, so a crash never leaves a torn snapshot
//! - Undecodable snapshots are discarded and the session starts fresh

pub mod envelope;
pub mod store;

pub use envelope::{Envelope, FORMAT_VERSION, decode, encode};
pub use store::{FileStore, MemoryStore, SnapshotStore};
