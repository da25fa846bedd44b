//! OLE2 (Compound File Binary) container reader.
//!
//! HWP 5.x documents are stored as compound files: a small FAT file system
//! holding named storages (directories) and streams. The package layer only
//! needs to test whether a stream exists and to read a stream in full, so
//! this reader loads the allocation tables and the directory up front and
//! follows sector chains on demand.

/// Constants for OLE file format
pub mod consts;

/// Main OLE file parsing implementation
mod file;

// Re-export public types for convenient access
pub use file::{DirectoryEntry, OleError, OleFile, is_ole_file};

#[cfg(test)]
pub(crate) use file::fixture;
