//! depot - local-network file drop box
//!
//! A small HTTP service that accepts multi-file uploads into a single flat
//! directory and serves listing, metadata, inline viewing, download,
//! zip bundling and deletion of the stored files. The directory is the
//! only source of truth; there is no database and no in-memory index.

pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod web;

pub use config::Config;
pub use error::{DepotError, Result};
pub use store::{
    generate, sanitize, write_zip, BatchDeleteOutcome, DeleteFailure, FileInfo, FileStore,
    IncomingFile, SavedFile,
};
pub use web::WebServer;
