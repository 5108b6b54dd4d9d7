//! Filename transcoding between plaintext and encrypted-extension forms
//!
//! The external encrypter renames each file it processes; this module
//! predicts those names so timestamps can be restored at the right paths.
//! Only the final path segment is rewritten; the directory portion and its
//! separator characters pass through untouched. Both `/` and `\` are
//! recognized as separators since the sync tool hands us paths in either
//! convention.
//!
//! Encrypt direction: the last `.` of the segment becomes `-` and the
//! `.axx` marker is prepended (`notes.txt` → `.axxnotes-txt`). Decrypt
//! direction undoes both steps. A dotless original that contains a literal
//! `-` does NOT round-trip (`my-file` comes back as `my.file`); that is a
//! long-standing limitation of the naming scheme, asserted as-is in the
//! tests below rather than silently repaired.

use std::path::PathBuf;

use crate::config::{ENCRYPTED_MARKER, Phase};
use crate::timestamps::FileTimestampMap;

/// Splits a path string after its last separator (`/` or `\`). The first
/// half keeps the trailing separator; for separator-free input it is empty.
fn split_at_last_separator(path: &str) -> (&str, &str) {
    match path.rfind(['/', '\\']) {
        Some(idx) => path.split_at(idx + 1),
        None => ("", path),
    }
}

/// Derives the name the encrypter will give an encrypted file.
pub fn encrypt_name(path: &str) -> String {
    let (dir, name) = split_at_last_separator(path);
    let mut segment = String::with_capacity(ENCRYPTED_MARKER.len() + name.len());
    segment.push_str(ENCRYPTED_MARKER);
    match name.rfind('.') {
        Some(idx) => {
            segment.push_str(&name[..idx]);
            segment.push('-');
            segment.push_str(&name[idx + 1..]);
        }
        None => segment.push_str(name),
    }
    format!("{dir}{segment}")
}

/// Derives the name the encrypter will give a decrypted file.
pub fn decrypt_name(path: &str) -> String {
    let (dir, name) = split_at_last_separator(path);
    let stripped = match name.rfind(ENCRYPTED_MARKER) {
        Some(idx) => {
            let mut s = String::with_capacity(name.len() - ENCRYPTED_MARKER.len());
            s.push_str(&name[..idx]);
            s.push_str(&name[idx + ENCRYPTED_MARKER.len()..]);
            s
        }
        None => name.to_string(),
    };
    let restored = match stripped.rfind('-') {
        Some(idx) => {
            let mut s = stripped.clone();
            s.replace_range(idx..idx + 1, ".");
            s
        }
        None => stripped,
    };
    format!("{dir}{restored}")
}

/// Rekeys a timestamp map by the post-transform paths for the given phase.
/// Timestamp values carry over unchanged.
pub fn transcode_map(map: FileTimestampMap, phase: Phase) -> FileTimestampMap {
    map.into_iter()
        .map(|(path, stamps)| {
            let original = path.to_string_lossy();
            let transcoded = match phase {
                Phase::PreAnalysis => encrypt_name(&original),
                Phase::PostSync => decrypt_name(&original),
            };
            (PathBuf::from(transcoded), stamps)
        })
        .collect()
}
