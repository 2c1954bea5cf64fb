//! On-disk name generation.
//!
//! A stored name is the sanitized base name joined with a
//! millisecond-resolution timestamp, so two uploads of the same file in
//! different milliseconds never contend on the same path. The extension is
//! carried over verbatim (case included) so extension-keyed content-type
//! lookups keep working on the stored name.

use chrono::NaiveDateTime;

use super::sanitize::sanitize;

/// Split a filename into base and extension.
///
/// The extension is the substring from the last `.` (dot included); a name
/// without a dot, or with only a leading dot, has no extension.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Generate the stored name for an uploaded file captured at `now`.
///
/// Format: `{sanitized-base}_{DD-MM-YYYY-HH-MM-SS-mmm}{ext}`, every
/// timestamp component zero-padded to fixed width.
pub fn generate(original_name: &str, now: NaiveDateTime) -> String {
    let (base, ext) = split_name(original_name);
    let stamp = now.format("%d-%m-%Y-%H-%M-%S-%3f");
    format!("{}_{stamp}{ext}", sanitize(base))
}
