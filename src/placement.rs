//! Destination path planning
//!
//! A file lands in `output/<year>/<month>.<month name>/<subdirectory>/<name>`,
//! where the date is the earlier of its creation and modification times and
//! the subdirectory mirrors where it sat under its input root.

use crate::locale::MonthLocale;
use crate::scan::FileEntry;
use chrono::Datelike;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Planned location of a file in the output tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPath {
    pub year: i32,
    /// `"<month>.<month name>"`, e.g. `3.Marzo`
    pub month_label: String,
    /// `/`-separated subdirectory, possibly empty
    pub subdirectory: String,
    /// Source file name, byte-for-byte
    pub file_name: OsString,
}

impl DestinationPath {
    /// Directory that will contain the file
    pub fn directory(&self, output_root: &Path) -> PathBuf {
        let mut dir = output_root.join(self.year.to_string());
        dir.push(&self.month_label);
        for segment in self.subdirectory.split('/').filter(|s| !s.is_empty()) {
            dir.push(segment);
        }
        dir
    }

    /// Full destination path of the file
    pub fn file_path(&self, output_root: &Path) -> PathBuf {
        self.directory(output_root).join(&self.file_name)
    }
}

/// Plan where `entry` goes. Pure: nothing is touched on disk.
pub fn plan_destination(entry: &FileEntry, locale: MonthLocale) -> DestinationPath {
    let date = entry.earliest();

    DestinationPath {
        year: date.year(),
        month_label: locale.month_label(date.month()),
        subdirectory: mirrored_subdirectory(&entry.relative_dir),
        file_name: entry.file_name(),
    }
}

/// Keep the relative directory only if it has at least one lowercase ASCII
/// letter. Camera dumps like `DCIM/100CANON` are flattened away.
pub fn mirrored_subdirectory(relative_dir: &str) -> String {
    let normalized = relative_dir.replace('\\', "/");
    if normalized.bytes().any(|b| b.is_ascii_lowercase()) {
        normalized.trim_matches('/').to_string()
    } else {
        String::new()
    }
}

/// Create `dir` and all missing parents. A no-op when it already exists.
pub fn ensure_directory(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    trace!(?dir, "Creating destination directory");
    fs::create_dir_all(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use tempfile::tempdir;

    fn entry(name: &str, created: (i32, u32, u32), modified: (i32, u32, u32), rel: &str) -> FileEntry {
        let c = Local
            .with_ymd_and_hms(created.0, created.1, created.2, 12, 0, 0)
            .unwrap();
        let m = Local
            .with_ymd_and_hms(modified.0, modified.1, modified.2, 12, 0, 0)
            .unwrap();
        FileEntry::new(PathBuf::from("/in").join(rel).join(name), c, m, rel)
    }

    #[test]
    fn test_plan_uses_earlier_timestamp() {
        let e = entry("photo.jpg", (2023, 3, 15), (2023, 3, 16), "vacation/Day1");
        let dest = plan_destination(&e, MonthLocale::English);

        assert_eq!(dest.year, 2023);
        assert_eq!(dest.month_label, "3.March");
        assert_eq!(dest.subdirectory, "vacation/Day1");
        assert_eq!(
            dest.file_path(Path::new("/out")),
            Path::new("/out/2023/3.March/vacation/Day1/photo.jpg")
        );
    }

    #[test]
    fn test_copied_file_with_reset_creation_time() {
        // Created "now" by a copy, but last written years earlier
        let e = entry("old.png", (2025, 11, 2), (2019, 7, 30), "");
        let dest = plan_destination(&e, MonthLocale::Italian);

        assert_eq!(dest.year, 2019);
        assert_eq!(dest.month_label, "7.Luglio");
        assert_eq!(dest.directory(Path::new("/out")), Path::new("/out/2019/7.Luglio"));
    }

    #[test]
    fn test_plan_is_deterministic() {
        let e = entry("img.png", (2024, 1, 5), (2024, 1, 9), "family");
        assert_eq!(
            plan_destination(&e, MonthLocale::Italian),
            plan_destination(&e.clone(), MonthLocale::Italian)
        );
    }

    #[test]
    fn test_subdirectory_without_lowercase_is_dropped() {
        assert_eq!(mirrored_subdirectory("DCIM/100CANON"), "");
        assert_eq!(mirrored_subdirectory("2023_01"), "");
        assert_eq!(mirrored_subdirectory(""), "");
        assert_eq!(mirrored_subdirectory("DCIM/Camera"), "DCIM/Camera");
        assert_eq!(mirrored_subdirectory("Trip\\beach"), "Trip/beach");
    }

    #[test]
    fn test_ensure_directory_is_idempotent() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("2024").join("1.Gennaio").join("nested");

        ensure_directory(&target).unwrap();
        assert!(target.is_dir());
        ensure_directory(&target).unwrap();
        assert!(target.is_dir());
    }
}
