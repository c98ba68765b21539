//! Zip-backed archives holding one adventure each.
//!
//! An [`ArchiveStore`] manages a directory of `<key>.zip` files. Opening a
//! key yields an [`Archive`]: an in-memory view of the container whose
//! entries all live under a root directory named after the key. Changes are
//! written back atomically when the archive is closed or dropped.

/// A single open archive and its entry writer.
pub mod archive;
/// Error types used throughout the crate.
pub mod error;
/// The directory of archives and the open-key registry.
pub mod store;

pub use archive::{Archive, EntryWriter};
pub use error::{ArchiveError, ArchiveResult};
pub use store::ArchiveStore;
