//! Configuration types for the photo organizer

use crate::locale::MonthLocale;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions accepted by default: images, audio, video, documents and web assets
const DEFAULT_EXTENSIONS: &[&str] = &[
    // Images
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tif", ".tiff", ".webp", ".heic", ".heif",
    ".svg", ".ico", ".raw", ".cr2", ".nef", ".arw", ".dng",
    // Audio
    ".mp3", ".wav", ".flac", ".aac", ".ogg", ".m4a", ".wma",
    // Video
    ".mp4", ".mov", ".avi", ".mkv", ".wmv", ".flv", ".m4v", ".3gp", ".mpg", ".mpeg", ".webm",
    // Documents
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt", ".rtf", ".txt",
    // Web assets
    ".html", ".htm", ".css", ".js", ".json", ".xml",
];

/// Configuration for the photo organizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Input roots, scanned recursively in order
    pub input_dirs: Vec<PathBuf>,

    /// Root of the dated output tree
    pub output_dir: PathBuf,

    /// Locale of the month folder names
    #[serde(default)]
    pub month_locale: MonthLocale,

    /// Accepted extensions, with leading dot, compared case-insensitively
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Copy the source modification time onto the copied file
    #[serde(default = "default_true")]
    pub preserve_mtime: bool,

    /// Write a JSON run report to this path when set
    #[serde(default)]
    pub report_file: Option<PathBuf>,

    /// Verbose output
    #[serde(default)]
    pub verbose: bool,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dirs: vec![],
            output_dir: PathBuf::from("output"),
            month_locale: MonthLocale::default(),
            extensions: default_extensions(),
            preserve_mtime: true,
            report_file: None,
            verbose: false,
        }
    }
}

impl Config {
    /// Check an extension against the allow-list.
    ///
    /// `ext` includes the leading dot; an empty string never matches.
    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        !ext.is_empty() && self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            source: e,
        })?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Photo Organizer Configuration File
# This file uses TOML format (https://toml.io)

# Input directories, scanned recursively in the listed order
input_dirs = [
    "D:/Camera",
    "D:/Phone Backup",
]

# Root of the dated tree: <output_dir>/<year>/<month>.<month name>/<subfolder>
output_dir = "D:/Sorted"

# Month folder names: "italian", "english", "french", "german", "spanish"
# or "system" to follow the operating system language
month_locale = "italian"

# Copy the source modification time onto copied files
preserve_mtime = true

# Optional JSON report with per-outcome totals and failed files
# report_file = "D:/Sorted/report.json"

# Verbose output - show detailed processing information
verbose = false

# Accepted extensions (leading dot, case-insensitive)
extensions = [
    ".jpg", ".jpeg", ".png", ".gif", ".heic", ".mp4", ".mov", ".mp3", ".pdf",
]
"#
        .to_string()
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to serialize configuration
    SerializeError {
        source: toml::ser::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
            ConfigError::SerializeError { source } => {
                write!(f, "Failed to serialize config: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::SerializeError { source } => Some(source),
        }
    }
}
