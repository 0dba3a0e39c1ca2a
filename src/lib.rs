//! Photo Organizer - sort pictures and media into a dated directory tree
//!
//! This library provides the organizing engine:
//! - Recursive scanning of input roots, skipping hidden entries
//! - Dated destination planning (`<year>/<month>.<month name>/<subfolder>`)
//! - Byte-for-byte duplicate detection against existing destinations
//! - Collision renaming with `_1`, `_2`, ... suffixes
//! - Portable file name validation
//! - Sequential copying on a background worker with progress events

pub mod cli;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod locale;
pub mod organizer;
pub mod os;
pub mod placement;
pub mod scan;
pub mod validate;

pub use cli::Cli;
pub use config::{Config, ConfigError};
pub use error::{Error, Result};
pub use locale::MonthLocale;
pub use organizer::{
    FileReport, Organizer, OrganizerEvent, OrganizerHandle, ProcessingOutcome, ProgressSnapshot,
    RunSummary,
};
pub use placement::DestinationPath;
pub use scan::{FileEntry, WalkEvent, Walker};
