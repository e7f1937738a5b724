//! Password preprocessing
//!
//! Before key derivation, passwords are NFKD-normalized and stripped of the
//! C0 (U+0000..U+001F), Delete (U+007F), and C1 (U+0080..U+009F) control
//! codes. Whitespace is never trimmed: a trailing newline in a password file
//! disappears because `\n` is a C0 control, not because of trimming.

use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use crate::error::KeystoreResult;

/// Normalize raw password-file bytes into the canonical KDF input.
///
/// The input must be valid UTF-8. The result may be empty; an empty password
/// is still fed to the KDF.
pub fn preprocess(bytes: &[u8]) -> KeystoreResult<Zeroizing<String>> {
    let raw = core::str::from_utf8(bytes)?;
    // `char::is_control` matches exactly C0, Delete, and C1.
    let mut normalized = Zeroizing::new(String::with_capacity(raw.len()));
    normalized.extend(raw.nfkd().filter(|c| !c.is_control()));
    Ok(normalized)
}
