//! Filesystem-backed file store.
//!
//! A `FileStore` owns a single flat directory. The directory is the only
//! source of truth: every read re-derives state from it, there is no
//! in-memory index and no locking. Individual create/write/delete
//! operations rely on the filesystem's own atomicity, so concurrent
//! requests race benignly (a listed name may be gone by the time it is
//! stat'ed; callers treat that NotFound as a normal race).

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::Local;
use serde::Serialize;

use crate::{DepotError, Result};

use super::encoding::redecode_display_name;
use super::naming::{generate, split_name};

/// One raw payload from an upload batch.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Client-supplied display name (possibly latin1 mojibake).
    pub original_name: String,
    /// Declared content type, if the client sent one.
    pub content_type: Option<String>,
    /// Full payload.
    pub bytes: Vec<u8>,
}

/// A persisted file as reported back to the uploader.
///
/// The display name is only returned here; it is not persisted anywhere,
/// so it is lost once the upload response is consumed.
#[derive(Debug, Clone, Serialize)]
pub struct SavedFile {
    /// Unique on-disk identifier.
    pub stored_name: String,
    /// Repaired client-supplied display name.
    pub display_name: String,
    /// Payload size in bytes.
    pub size: u64,
}

/// Size and mtime of a stored file.
#[derive(Debug, Clone, Copy)]
pub struct FileInfo {
    /// Size in bytes.
    pub size: u64,
    /// Modification time as Unix milliseconds.
    pub modified_ms: i64,
}

/// A single failed entry of a batch delete.
#[derive(Debug)]
pub struct DeleteFailure {
    /// The stored name that could not be deleted.
    pub name: String,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Outcome of a best-effort batch delete.
///
/// Every requested name is attempted exactly once; the caller always
/// learns which subset succeeded.
#[derive(Debug, Default)]
pub struct BatchDeleteOutcome {
    /// Number of files actually removed.
    pub deleted: usize,
    /// Per-item failures, in input order.
    pub failures: Vec<DeleteFailure>,
}

/// File store over a single flat directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a new store rooted at `root`, creating the directory
    /// (including parents) if absent.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { root: root.into() };
        store.ensure_root()?;
        Ok(store)
    }

    /// Create the storage directory if absent. Idempotent.
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Get the storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a stored name to a path strictly inside the root.
    ///
    /// Any name that could name something outside the flat directory
    /// (path separators, `.`/`..`, NUL, empty) is rejected with
    /// `InvalidName` before it ever reaches a path join.
    pub fn resolve(&self, stored_name: &str) -> Result<PathBuf> {
        if stored_name.is_empty()
            || stored_name == "."
            || stored_name == ".."
            || stored_name.contains('/')
            || stored_name.contains('\\')
            || stored_name.contains('\0')
        {
            return Err(DepotError::InvalidName(stored_name.to_string()));
        }
        Ok(self.root.join(stored_name))
    }

    /// Persist an upload batch, in the order received.
    ///
    /// Each payload gets a name generated from the capture-time clock
    /// reading and is written independently; there is no rollback across
    /// the batch, and no cleanup of a partially written file if an
    /// individual write fails mid-stream.
    pub fn save(&self, files: Vec<IncomingFile>) -> Result<Vec<SavedFile>> {
        let mut saved = Vec::with_capacity(files.len());
        for file in files {
            let now = Local::now().naive_local();
            let name = generate(&file.original_name, now);
            let stored_name = self.write_unique(&name, &file.bytes)?;
            tracing::debug!(
                stored_name = %stored_name,
                size = file.bytes.len(),
                content_type = file.content_type.as_deref().unwrap_or(""),
                "stored uploaded file"
            );
            saved.push(SavedFile {
                stored_name,
                display_name: redecode_display_name(&file.original_name),
                size: file.bytes.len() as u64,
            });
        }
        Ok(saved)
    }

    /// Write `bytes` under `name` without overwriting.
    ///
    /// Two uploads with the same sanitized base can land on the same
    /// millisecond stamp; `create_new` detects the collision and a numeric
    /// disambiguator is inserted before the extension until the create
    /// succeeds.
    fn write_unique(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let mut candidate = name.to_string();
        let mut attempt = 0u32;
        loop {
            let path = self.resolve(&candidate)?;
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut f) => {
                    f.write_all(bytes)?;
                    return Ok(candidate);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    attempt += 1;
                    let (base, ext) = split_name(name);
                    candidate = format!("{base}-{attempt}{ext}");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// List all current stored names, in filesystem enumeration order.
    ///
    /// Always re-reads the directory; callers needing a stable order must
    /// sort themselves.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Ok(name) = entry.file_name().into_string() {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }

    /// Get size and mtime of a stored file.
    pub fn info(&self, stored_name: &str) -> Result<FileInfo> {
        let path = self.resolve(stored_name)?;
        let meta = match fs::metadata(&path) {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Err(DepotError::NotFound(stored_name.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DepotError::NotFound(stored_name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let modified_ms = meta
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Ok(FileInfo {
            size: meta.len(),
            modified_ms,
        })
    }

    /// Open a stored file for sequential reading.
    pub fn open(&self, stored_name: &str) -> Result<File> {
        let path = self.resolve(stored_name)?;
        match File::open(&path) {
            Ok(f) => Ok(f),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DepotError::NotFound(stored_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read a stored file's full content.
    pub fn read(&self, stored_name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(stored_name)?;
        match fs::read(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DepotError::NotFound(stored_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a stored file.
    pub fn delete(&self, stored_name: &str) -> Result<()> {
        let path = self.resolve(stored_name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DepotError::NotFound(stored_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a batch of stored files, best-effort.
    ///
    /// Every name is attempted exactly once, in input order; a missing
    /// file is a per-item failure, not an abort.
    pub fn delete_batch(&self, names: &[String]) -> BatchDeleteOutcome {
        let mut outcome = BatchDeleteOutcome::default();
        for name in names {
            match self.delete(name) {
                Ok(()) => outcome.deleted += 1,
                Err(DepotError::NotFound(_)) => outcome.failures.push(DeleteFailure {
                    name: name.clone(),
                    reason: "File not found".to_string(),
                }),
                Err(e) => outcome.failures.push(DeleteFailure {
                    name: name.clone(),
                    reason: e.to_string(),
                }),
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, FileStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path()).unwrap();
        (temp_dir, store)
    }

    fn incoming(name: &str, bytes: &[u8]) -> IncomingFile {
        IncomingFile {
            original_name: name.to_string(),
            content_type: None,
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_new_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("nested").join("uploads");

        assert!(!root.exists());
        let store = FileStore::new(&root).unwrap();
        assert!(root.exists());
        assert_eq!(store.root(), root);
    }

    #[test]
    fn test_ensure_root_idempotent() {
        let (_temp_dir, store) = setup_store();
        store.ensure_root().unwrap();
        store.ensure_root().unwrap();
    }

    #[test]
    fn test_save_and_read() {
        let (_temp_dir, store) = setup_store();

        let saved = store.save(vec![incoming("Test File.txt", b"hello")]).unwrap();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].stored_name.starts_with("test-file_"));
        assert!(saved[0].stored_name.ends_with(".txt"));
        assert_eq!(saved[0].display_name, "Test File.txt");
        assert_eq!(saved[0].size, 5);

        let content = store.read(&saved[0].stored_name).unwrap();
        assert_eq!(content, b"hello");
    }

    #[test]
    fn test_save_batch_yields_distinct_resolvable_names() {
        let (_temp_dir, store) = setup_store();

        let saved = store
            .save(vec![
                incoming("a.txt", b"1"),
                incoming("b.txt", b"2"),
                incoming("c.txt", b"3"),
            ])
            .unwrap();

        assert_eq!(saved.len(), 3);
        let names: std::collections::HashSet<_> =
            saved.iter().map(|f| f.stored_name.clone()).collect();
        assert_eq!(names.len(), 3);

        for file in &saved {
            store.info(&file.stored_name).unwrap();
        }
    }

    #[test]
    fn test_same_base_same_millisecond_disambiguated() {
        let (_temp_dir, store) = setup_store();

        // Force the collision: write both payloads under one generated name.
        let name = generate("same.txt", Local::now().naive_local());
        let first = store.write_unique(&name, b"one").unwrap();
        let second = store.write_unique(&name, b"two").unwrap();

        assert_eq!(first, name);
        assert_ne!(second, first);
        assert!(second.ends_with(".txt"));
        assert_eq!(store.read(&first).unwrap(), b"one");
        assert_eq!(store.read(&second).unwrap(), b"two");
    }

    #[test]
    fn test_list_reflects_directory() {
        let (_temp_dir, store) = setup_store();
        assert!(store.list().unwrap().is_empty());

        let saved = store
            .save(vec![incoming("x.bin", b"x"), incoming("y.bin", b"y")])
            .unwrap();

        let mut listed = store.list().unwrap();
        listed.sort();
        let mut expected: Vec<_> = saved.iter().map(|f| f.stored_name.clone()).collect();
        expected.sort();
        assert_eq!(listed, expected);
    }

    #[test]
    fn test_list_skips_subdirectories() {
        let (_temp_dir, store) = setup_store();
        fs::create_dir(store.root().join("subdir")).unwrap();
        store.save(vec![incoming("f.txt", b"f")]).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed.contains(&"subdir".to_string()));
    }

    #[test]
    fn test_info() {
        let (_temp_dir, store) = setup_store();
        let saved = store.save(vec![incoming("s.txt", b"123456")]).unwrap();

        let info = store.info(&saved[0].stored_name).unwrap();
        assert_eq!(info.size, 6);
        assert!(info.modified_ms > 0);
    }

    #[test]
    fn test_info_not_found() {
        let (_temp_dir, store) = setup_store();
        let result = store.info("missing.txt");
        assert!(matches!(result, Err(DepotError::NotFound(_))));
    }

    #[test]
    fn test_open_not_found() {
        let (_temp_dir, store) = setup_store();
        assert!(matches!(
            store.open("missing.txt"),
            Err(DepotError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, store) = setup_store();
        let saved = store.save(vec![incoming("d.txt", b"bye")]).unwrap();

        store.delete(&saved[0].stored_name).unwrap();
        assert!(matches!(
            store.info(&saved[0].stored_name),
            Err(DepotError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_not_found() {
        let (_temp_dir, store) = setup_store();
        assert!(matches!(
            store.delete("missing.txt"),
            Err(DepotError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_batch_partial_failure() {
        let (_temp_dir, store) = setup_store();
        let saved = store
            .save(vec![incoming("a.txt", b"a"), incoming("b.txt", b"b")])
            .unwrap();

        let names = vec![
            saved[0].stored_name.clone(),
            "missing.txt".to_string(),
            saved[1].stored_name.clone(),
        ];
        let outcome = store.delete_batch(&names);

        assert_eq!(outcome.deleted, 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].name, "missing.txt");
        assert_eq!(outcome.failures[0].reason, "File not found");

        assert!(matches!(
            store.info(&saved[0].stored_name),
            Err(DepotError::NotFound(_))
        ));
        assert!(matches!(
            store.info(&saved[1].stored_name),
            Err(DepotError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_batch_empty() {
        let (_temp_dir, store) = setup_store();
        let outcome = store.delete_batch(&[]);
        assert_eq!(outcome.deleted, 0);
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let (_temp_dir, store) = setup_store();

        for name in ["../escape.txt", "a/b.txt", "..", ".", "", "a\\b", "nul\0byte"] {
            assert!(
                matches!(store.resolve(name), Err(DepotError::InvalidName(_))),
                "expected InvalidName for {name:?}"
            );
        }
    }

    #[test]
    fn test_operations_reject_traversal() {
        let (_temp_dir, store) = setup_store();

        assert!(matches!(
            store.info("../secret"),
            Err(DepotError::InvalidName(_))
        ));
        assert!(matches!(
            store.delete("../secret"),
            Err(DepotError::InvalidName(_))
        ));
        assert!(matches!(
            store.open("a/../../b"),
            Err(DepotError::InvalidName(_))
        ));
    }

    #[test]
    fn test_mojibake_display_name_repaired() {
        let (_temp_dir, store) = setup_store();

        // "ülke.txt" delivered with its UTF-8 bytes widened to latin1 chars.
        let saved = store
            .save(vec![incoming("\u{c3}\u{bc}lke.txt", b"data")])
            .unwrap();
        assert_eq!(saved[0].display_name, "ülke.txt");
    }

    #[test]
    fn test_binary_content_roundtrip() {
        let (_temp_dir, store) = setup_store();
        let content: Vec<u8> = (0..=255).collect();

        let saved = store.save(vec![incoming("bin.dat", &content)]).unwrap();
        assert_eq!(store.read(&saved[0].stored_name).unwrap(), content);
    }
}
