//! Filename sanitization.
//!
//! Maps a user-supplied base name to a safe, bounded, ASCII-normalized
//! form usable as the stem of an on-disk filename.

use unicode_normalization::UnicodeNormalization;

/// Replacement for characters that survive no other rule.
const PLACEHOLDER: char = '-';

/// Maximum length of a sanitized base name (in characters).
pub const MAX_BASE_NAME_LENGTH: usize = 255;

/// Transliterate a Turkish-alphabet letter to its closest ASCII letter.
///
/// These are handled before Unicode decomposition: the dotless `ı` and
/// dotted `İ` have no combining-mark decomposition and would otherwise
/// fall through to the generic placeholder rule.
fn transliterate_turkish(c: char) -> Option<char> {
    match c {
        'ğ' => Some('g'),
        'ü' => Some('u'),
        'ş' => Some('s'),
        'ö' => Some('o'),
        'ç' => Some('c'),
        'ı' => Some('i'),
        'Ğ' => Some('G'),
        'Ü' => Some('U'),
        'Ş' => Some('S'),
        'Ö' => Some('O'),
        'Ç' => Some('C'),
        'İ' => Some('I'),
        _ => None,
    }
}

/// Sanitize a raw base name into a safe ASCII form.
///
/// Never fails; empty or all-invalid input sanitizes to an empty string,
/// which callers must tolerate.
pub fn sanitize(raw: &str) -> String {
    // Turkish letters first, then canonical decomposition with combining
    // diacritical marks stripped, so other accented Latin letters degrade
    // to their base letter instead of the placeholder.
    let decomposed: String = raw
        .chars()
        .map(|c| transliterate_turkish(c).unwrap_or(c))
        .collect::<String>()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect();

    let mut collapsed = String::with_capacity(decomposed.len());
    let mut prev_placeholder = false;
    for c in decomposed.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
            c
        } else {
            PLACEHOLDER
        };
        if c == PLACEHOLDER {
            if !prev_placeholder {
                collapsed.push(c);
            }
            prev_placeholder = true;
        } else {
            collapsed.push(c);
            prev_placeholder = false;
        }
    }

    collapsed
        .trim_matches(PLACEHOLDER)
        .trim_start_matches('.')
        .chars()
        .take(MAX_BASE_NAME_LENGTH)
        .collect::<String>()
        .to_lowercase()
}
