//! Display-name re-decoding.
//!
//! Multipart transports from some browsers deliver non-ASCII filenames as
//! latin1 mojibake: each byte of the UTF-8 name widened to one character.
//! The repair is the inverse transform, narrow back to bytes and re-read
//! them as UTF-8.

/// Repair a latin1-mojibake display name.
///
/// Returns the input unchanged when it is not latin1-shaped (contains
/// characters above U+00FF, so it is already proper UTF-8 text) or when the
/// narrowed bytes are not valid UTF-8 (the name really was latin1 text).
pub fn redecode_display_name(name: &str) -> String {
    if !encoding_rs::mem::is_str_latin1(name) {
        return name.to_string();
    }
    let bytes = encoding_rs::mem::encode_latin1_lossy(name);
    match std::str::from_utf8(&bytes) {
        Ok(decoded) => decoded.to_string(),
        Err(_) => name.to_string(),
    }
}
