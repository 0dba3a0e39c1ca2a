//! Platform-specific file system rules.
//!
//! Hidden-file detection and the set of characters a file name may not
//! contain differ between Windows and Unix-like systems.

#[cfg(windows)]
pub mod windows;

#[cfg(unix)]
pub mod unix;

use std::fs::Metadata;
use std::path::Path;

/// Check if an entry carries the platform's hidden marker.
#[cfg(unix)]
pub fn is_hidden(path: &Path, _metadata: &Metadata) -> bool {
    unix::has_dot_prefix(path)
}

/// Check if an entry carries the platform's hidden marker.
#[cfg(windows)]
pub fn is_hidden(path: &Path, metadata: &Metadata) -> bool {
    windows::has_hidden_attribute(metadata) || windows::has_dot_prefix(path)
}

/// Characters that may never appear in a file name on this platform.
#[cfg(unix)]
pub fn invalid_file_name_chars() -> &'static [char] {
    unix::INVALID_FILE_NAME_CHARS
}

/// Characters that may never appear in a file name on this platform.
#[cfg(windows)]
pub fn invalid_file_name_chars() -> &'static [char] {
    windows::INVALID_FILE_NAME_CHARS
}
