//! Windows-specific file system rules.

use std::fs::Metadata;
use std::os::windows::fs::MetadataExt;
use std::path::Path;
use winapi::um::winnt::FILE_ATTRIBUTE_HIDDEN;

/// Characters rejected by NTFS/FAT file names, including ASCII control codes.
pub const INVALID_FILE_NAME_CHARS: &[char] = &[
    '"', '<', '>', '|', ':', '*', '?', '\\', '/', '\0', '\u{1}', '\u{2}', '\u{3}', '\u{4}',
    '\u{5}', '\u{6}', '\u{7}', '\u{8}', '\u{9}', '\u{a}', '\u{b}', '\u{c}', '\u{d}', '\u{e}',
    '\u{f}', '\u{10}', '\u{11}', '\u{12}', '\u{13}', '\u{14}', '\u{15}', '\u{16}', '\u{17}',
    '\u{18}', '\u{19}', '\u{1a}', '\u{1b}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{1f}',
];

/// Check the FILE_ATTRIBUTE_HIDDEN bit of an entry.
pub fn has_hidden_attribute(metadata: &Metadata) -> bool {
    metadata.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0
}

/// Files synced from Unix machines keep their dot-prefixed names.
pub fn has_dot_prefix(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
