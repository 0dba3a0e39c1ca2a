//! Duplicate detection and name collision resolution
//!
//! When the planned destination is already taken, the existing file is
//! compared byte for byte with the source. Identical content means the source
//! is a duplicate; different content gets a `_1`, `_2`, ... suffix.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Size of each chunk read during content comparison (1MB)
const CHUNK_SIZE: usize = 1024 * 1024;

/// Where a source file should go, given what is already at the destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing at the planned path
    Vacant(PathBuf),
    /// The planned path holds identical content
    Duplicate(PathBuf),
    /// The planned path holds different content; use this suffixed path instead
    Renamed(PathBuf),
}

impl Resolution {
    /// Path the file would be written to, if any
    pub fn target(&self) -> Option<&Path> {
        match self {
            Resolution::Vacant(p) | Resolution::Renamed(p) => Some(p),
            Resolution::Duplicate(_) => None,
        }
    }
}

/// Decide where `source` goes when planned for `candidate`
pub fn resolve_collision(source: &Path, candidate: PathBuf) -> Result<Resolution> {
    if !candidate.exists() {
        return Ok(Resolution::Vacant(candidate));
    }

    let identical = files_identical(source, &candidate).map_err(|e| Error::Comparison {
        source_path: source.to_path_buf(),
        existing: candidate.clone(),
        message: e.to_string(),
    })?;

    if identical {
        trace!(?source, existing = ?candidate, "Content already present at destination");
        return Ok(Resolution::Duplicate(candidate));
    }

    Ok(Resolution::Renamed(next_free_name(&candidate)))
}

/// First `<stem>_<n><ext>` next to `path` that does not exist, counting from 1
pub fn next_free_name(path: &Path) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default();
    let extension = path.extension();
    let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut counter: u64 = 1;
    loop {
        let mut name = stem.to_os_string();
        name.push(format!("_{}", counter));
        if let Some(ext) = extension {
            name.push(".");
            name.push(ext);
        }

        let candidate = parent.join(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Compare two files byte for byte.
///
/// Files of different length are unequal without reading any content.
/// Otherwise both are streamed in 1MB chunks, stopping at the first mismatch.
pub fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    let len_a = std::fs::metadata(a)?.len();
    let len_b = std::fs::metadata(b)?.len();
    if len_a != len_b {
        return Ok(false);
    }

    let mut file_a = File::open(a)?;
    let mut file_b = File::open(b)?;
    let mut buf_a = vec![0u8; CHUNK_SIZE];
    let mut buf_b = vec![0u8; CHUNK_SIZE];

    loop {
        let read_a = read_chunk(&mut file_a, &mut buf_a)?;
        let read_b = read_chunk(&mut file_b, &mut buf_b)?;

        if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
            return Ok(false);
        }
        if read_a == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows; returns less than `buf.len()` only at EOF
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    fn temp_with(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_identical_content() {
        let a = temp_with(b"same bytes");
        let b = temp_with(b"same bytes");
        assert!(files_identical(a.path(), b.path()).unwrap());
    }

    #[test]
    fn test_same_length_different_content() {
        let a = temp_with(b"content 1");
        let b = temp_with(b"content 2");
        assert!(!files_identical(a.path(), b.path()).unwrap());
    }

    #[test]
    fn test_different_length_is_not_identical() {
        let a = temp_with(b"short");
        let b = temp_with(b"short but longer");
        assert!(!files_identical(a.path(), b.path()).unwrap());
    }

    #[test]
    fn test_multi_chunk_comparison() {
        let mut data = vec![7u8; CHUNK_SIZE * 2 + 123];
        let a = temp_with(&data);
        let b = temp_with(&data);
        assert!(files_identical(a.path(), b.path()).unwrap());

        // Differ only in the last chunk
        let last = data.len() - 1;
        data[last] = 8;
        let c = temp_with(&data);
        assert!(!files_identical(a.path(), c.path()).unwrap());
    }

    #[test]
    fn test_empty_files_are_identical() {
        let a = temp_with(b"");
        let b = temp_with(b"");
        assert!(files_identical(a.path(), b.path()).unwrap());
    }

    #[test]
    fn test_resolve_vacant() {
        let dir = tempdir().unwrap();
        let source = temp_with(b"abc");
        let candidate = dir.path().join("img.png");

        let resolution = resolve_collision(source.path(), candidate.clone()).unwrap();
        assert_eq!(resolution, Resolution::Vacant(candidate));
    }

    #[test]
    fn test_resolve_duplicate() {
        let dir = tempdir().unwrap();
        let source = temp_with(b"abc");
        let candidate = dir.path().join("img.png");
        fs::write(&candidate, b"abc").unwrap();

        let resolution = resolve_collision(source.path(), candidate.clone()).unwrap();
        assert_eq!(resolution, Resolution::Duplicate(candidate));
        assert!(resolution.target().is_none());
    }

    #[test]
    fn test_resolve_renames_with_incrementing_suffix() {
        let dir = tempdir().unwrap();
        let source = temp_with(b"new");
        let candidate = dir.path().join("img.png");
        fs::write(&candidate, b"old").unwrap();
        fs::write(dir.path().join("img_1.png"), b"older").unwrap();

        let resolution = resolve_collision(source.path(), candidate).unwrap();
        assert_eq!(resolution, Resolution::Renamed(dir.path().join("img_2.png")));
    }

    #[test]
    fn test_suffixed_candidates_are_not_compared() {
        // img_1.png holds the same bytes as the source, but only the first
        // planned path is content-checked
        let dir = tempdir().unwrap();
        let source = temp_with(b"payload");
        let candidate = dir.path().join("img.png");
        fs::write(&candidate, b"other").unwrap();
        fs::write(dir.path().join("img_1.png"), b"payload").unwrap();

        let resolution = resolve_collision(source.path(), candidate).unwrap();
        assert_eq!(resolution, Resolution::Renamed(dir.path().join("img_2.png")));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_next_free_name_keeps_non_utf8_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join(OsStr::from_bytes(b"caf\xE9.jpg"));
        fs::write(&path, b"x").unwrap();

        let renamed = next_free_name(&path);
        assert_eq!(renamed.file_name().unwrap().as_bytes(), b"caf\xE9_1.jpg");
    }

    #[test]
    fn test_next_free_name_without_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("README");
        fs::write(&path, b"x").unwrap();
        assert_eq!(next_free_name(&path), dir.path().join("README_1"));
    }
}
