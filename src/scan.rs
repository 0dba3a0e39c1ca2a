//! Input tree traversal
//!
//! Two passes run over the input roots:
//! - [`count_files`] sizes the batch so progress can be shown as a percentage
//! - [`Walker`] yields every file lazily, depth-first, direct files of a
//!   directory before its subdirectories

use crate::os;
use chrono::{DateTime, Local};
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::ffi::{OsStr, OsString};
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, FilterEntry, WalkDir};

/// Snapshot of a discovered file, taken once at discovery time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute (or root-joined) path of the file
    pub path: PathBuf,
    /// Creation time, or the modification time where the platform lacks one
    pub created: DateTime<Local>,
    /// Last modification time
    pub modified: DateTime<Local>,
    /// Extension with its leading dot, empty when the file has none
    pub extension: String,
    /// Directory of the file relative to its input root, `/`-separated
    pub relative_dir: String,
}

impl FileEntry {
    pub fn new(
        path: PathBuf,
        created: DateTime<Local>,
        modified: DateTime<Local>,
        relative_dir: impl Into<String>,
    ) -> Self {
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        Self {
            path,
            created,
            modified,
            extension,
            relative_dir: relative_dir.into(),
        }
    }

    /// Build an entry from file system metadata
    pub fn from_metadata(
        path: PathBuf,
        metadata: &Metadata,
        relative_dir: impl Into<String>,
    ) -> std::io::Result<Self> {
        let modified: DateTime<Local> = metadata.modified()?.into();
        let created: DateTime<Local> = metadata
            .created()
            .map(DateTime::from)
            .unwrap_or(modified);

        Ok(Self::new(path, created, modified, relative_dir))
    }

    /// The earlier of creation and modification time.
    ///
    /// Copying a file often resets its creation time to the copy moment,
    /// so the older timestamp is the better guess at when it was taken.
    pub fn earliest(&self) -> DateTime<Local> {
        self.created.min(self.modified)
    }

    /// File name exactly as stored on disk
    pub fn file_name(&self) -> OsString {
        self.path
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_default()
    }
}

/// One step of the walk
#[derive(Debug)]
pub enum WalkEvent {
    /// A visible file ready for classification
    File(FileEntry),
    /// A file carrying the platform hidden marker
    Hidden(PathBuf),
    /// An input root that does not exist or is not a directory
    MissingDirectory(PathBuf),
    /// A file whose metadata could not be read
    Failed { path: PathBuf, message: String },
}

/// Count the visible files under every root.
///
/// Directories whose name starts with `.` or that are hidden are not
/// descended. Unreadable subtrees contribute nothing and never fail the count.
pub fn count_files(roots: &[PathBuf]) -> usize {
    roots.iter().map(|root| count_root(root)).sum()
}

fn count_root(root: &Path) -> usize {
    if !root.is_dir() {
        return 0;
    }

    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !(e.file_type().is_dir() && is_skipped_count_dir(e)))
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(error = %err, "Unreadable entry while counting, skipping");
                None
            }
        })
        .filter(|e| !e.file_type().is_dir())
        .filter(|e| !is_hidden_entry(e))
        .count()
}

fn is_skipped_count_dir(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.') || is_hidden_entry(entry)
}

fn is_hidden_entry(entry: &DirEntry) -> bool {
    entry
        .metadata()
        .map(|m| os::is_hidden(entry.path(), &m))
        .unwrap_or(false)
}

/// Keep everything except hidden directories below the root
fn keep_entry(entry: &DirEntry) -> bool {
    entry.depth() == 0 || !(entry.file_type().is_dir() && is_hidden_entry(entry))
}

/// Files before directories, then by name, so a directory's own files are
/// visited before any subdirectory is descended
fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

type RootIter = FilterEntry<walkdir::IntoIter, fn(&DirEntry) -> bool>;

/// Lazy depth-first walk over a list of input roots
///
/// Roots are visited in the given order. The walker is finite and restartable
/// by building a new one over the same roots.
pub struct Walker {
    roots: VecDeque<PathBuf>,
    current: Option<(PathBuf, RootIter)>,
}

impl Walker {
    pub fn new<I>(roots: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        Self {
            roots: roots.into_iter().collect(),
            current: None,
        }
    }
}

impl Iterator for Walker {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<WalkEvent> {
        loop {
            if let Some((root, iter)) = &mut self.current {
                match iter.next() {
                    Some(Ok(entry)) => {
                        if entry.depth() == 0 || entry.file_type().is_dir() {
                            continue;
                        }
                        return Some(classify(root, &entry));
                    }
                    Some(Err(err)) => {
                        warn!(root = %root.display(), error = %err, "Skipping unreadable entry");
                        continue;
                    }
                    None => {
                        self.current = None;
                    }
                }
            }

            let root = self.roots.pop_front()?;
            if !root.is_dir() {
                return Some(WalkEvent::MissingDirectory(root));
            }

            let iter = WalkDir::new(&root)
                .follow_links(true)
                .sort_by(files_first)
                .into_iter()
                .filter_entry(keep_entry as fn(&DirEntry) -> bool);
            self.current = Some((root, iter));
        }
    }
}

fn classify(root: &Path, entry: &DirEntry) -> WalkEvent {
    let path = entry.path().to_path_buf();

    let metadata = match entry.metadata() {
        Ok(m) => m,
        Err(err) => {
            return WalkEvent::Failed {
                path,
                message: err.to_string(),
            };
        }
    };

    if os::is_hidden(&path, &metadata) {
        return WalkEvent::Hidden(path);
    }

    let relative_dir = relative_dir_of(root, &path);
    match FileEntry::from_metadata(path.clone(), &metadata, relative_dir) {
        Ok(file) => WalkEvent::File(file),
        Err(err) => WalkEvent::Failed {
            path,
            message: err.to_string(),
        },
    }
}

/// Directory portion of `path` relative to `root`, joined with `/`
pub fn relative_dir_of(root: &Path, path: &Path) -> String {
    let Some(parent) = path.parent() else {
        return String::new();
    };
    let Ok(relative) = parent.strip_prefix(root) else {
        return String::new();
    };

    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"data").unwrap();
    }

    #[test]
    fn test_relative_dir_uses_forward_slashes() {
        let root = Path::new("/in");
        let file = Path::new("/in/vacation/Day1/photo.jpg");
        assert_eq!(relative_dir_of(root, file), "vacation/Day1");
        assert_eq!(relative_dir_of(root, Path::new("/in/photo.jpg")), "");
    }

    #[test]
    fn test_earliest_timestamp() {
        let created = Local::now();
        let modified = created - chrono::Duration::days(3);
        let entry = FileEntry::new(PathBuf::from("/in/a.JPG"), created, modified, "");
        assert_eq!(entry.earliest(), modified);
        assert_eq!(entry.extension, ".JPG");
        assert_eq!(entry.file_name(), "a.JPG");
    }

    #[test]
    fn test_count_skips_dot_directories() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("sub/b.jpg"));
        touch(&dir.path().join("sub/deeper/c.txt"));
        touch(&dir.path().join(".cache/d.jpg"));

        assert_eq!(count_files(&[dir.path().to_path_buf()]), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_count_excludes_hidden_files() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join(".hidden.jpg"));

        assert_eq!(count_files(&[dir.path().to_path_buf()]), 1);
    }

    #[test]
    fn test_count_missing_root_is_zero() {
        let dir = tempdir().unwrap();
        let roots = vec![dir.path().join("missing")];
        assert_eq!(count_files(&roots), 0);
    }

    #[test]
    fn test_walker_visits_files_before_subdirectories() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("z.jpg"));
        touch(&dir.path().join("a/inner.jpg"));
        touch(&dir.path().join("b.jpg"));

        let names: Vec<OsString> = Walker::new(vec![dir.path().to_path_buf()])
            .filter_map(|event| match event {
                WalkEvent::File(f) => Some(f.file_name()),
                _ => None,
            })
            .collect();

        assert_eq!(names, vec!["b.jpg", "z.jpg", "inner.jpg"]);
    }

    #[test]
    fn test_walker_reports_missing_root_and_continues() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("present/a.jpg"));
        let roots = vec![dir.path().join("absent"), dir.path().join("present")];

        let events: Vec<WalkEvent> = Walker::new(roots).collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], WalkEvent::MissingDirectory(p) if p.ends_with("absent")));
        assert!(matches!(&events[1], WalkEvent::File(f) if f.relative_dir.is_empty()));
    }

    #[cfg(unix)]
    #[test]
    fn test_walker_skips_hidden_directories_and_flags_hidden_files() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join(".git/objects/blob.jpg"));
        touch(&dir.path().join(".secret.jpg"));
        touch(&dir.path().join("Trip/Day1/photo.jpg"));

        let events: Vec<WalkEvent> = Walker::new(vec![dir.path().to_path_buf()]).collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], WalkEvent::Hidden(p) if p.ends_with(".secret.jpg")));
        match &events[1] {
            WalkEvent::File(f) => assert_eq!(f.relative_dir, "Trip/Day1"),
            other => panic!("unexpected event {:?}", other),
        }
    }
}
