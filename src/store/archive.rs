//! Zip bundling of stored files.

use std::io::{self, Seek, Write};

use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::Result;

use super::storage::FileStore;

/// Write a zip archive of the named stored files to `sink`.
///
/// Names are visited in input order; each entry is stored under its bare
/// stored name and streamed into the writer, so memory use is bounded by
/// the copy buffer, not the selection size. A name that cannot be opened
/// (deleted concurrently, never existed, invalid) is skipped silently;
/// the bundle is best-effort and does not report skips. An empty name
/// list yields a valid empty archive.
///
/// Deflate at maximum compression: these transfers target slow LAN links,
/// so transfer size wins over CPU.
pub fn write_zip<W: Write + Seek>(store: &FileStore, names: &[String], sink: W) -> Result<()> {
    let mut zip = ZipWriter::new(sink);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9))
        .unix_permissions(0o644);

    for name in names {
        let mut file = match store.open(name) {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!(name = %name, error = %e, "skipping unavailable file in zip selection");
                continue;
            }
        };
        zip.start_file(name, options)?;
        io::copy(&mut file, &mut zip)?;
    }

    zip.finish()?;
    Ok(())
}
