//! Unix-like file system rules.

use std::path::Path;

/// Only the path separator and NUL are rejected by Unix file systems.
pub const INVALID_FILE_NAME_CHARS: &[char] = &['\0', '/'];

/// Unix has no hidden attribute; a leading dot is the convention.
pub fn has_dot_prefix(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
