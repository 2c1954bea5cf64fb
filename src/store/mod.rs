//! File store for depot.
//!
//! This module provides the upload-and-retrieval core:
//! - Filename sanitization and timestamped name generation
//! - Persistence over a single flat directory (the source of truth)
//! - Best-effort batch delete with per-item outcomes
//! - Best-effort zip bundling of a stored-file selection

mod archive;
mod encoding;
mod naming;
mod sanitize;
mod storage;

pub use archive::write_zip;
pub use encoding::redecode_display_name;
pub use naming::{generate, split_name};
pub use sanitize::{sanitize, MAX_BASE_NAME_LENGTH};
pub use storage::{
    BatchDeleteOutcome, DeleteFailure, FileInfo, FileStore, IncomingFile, SavedFile,
};
