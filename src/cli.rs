//! CLI argument parsing with clap

use crate::config::Config;
use crate::locale::MonthLocale;
use clap::Parser;
use std::path::PathBuf;

/// Photo Organizer - sort pictures and media into a dated folder tree
///
/// Files are copied into <output>/<year>/<month>.<month name>/<subfolder>,
/// dated by the earlier of their creation and modification times.
/// Identical files are skipped; name clashes get a numeric suffix.
#[derive(Parser, Debug)]
#[command(name = "photo-organizer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments will override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Input directories to scan for media files
    #[arg(short, long, num_args = 1..)]
    pub input: Option<Vec<PathBuf>>,

    /// Output directory for organized files
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Language of the month folder names
    #[arg(short, long, value_enum)]
    pub locale: Option<MonthLocale>,

    /// Write a JSON report of the run to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Leave the copy time as modification time of copied files
    #[arg(long)]
    pub no_preserve_mtime: bool,

    /// Print a sample configuration file and exit
    #[arg(long)]
    pub print_sample_config: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,
}

impl Cli {
    /// Get config file name (without extension) for log naming
    pub fn config_name(&self) -> Option<String> {
        self.config.as_ref().and_then(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref inputs) = self.input {
            config.input_dirs = inputs.clone();
        }
        if let Some(ref output) = self.output {
            config.output_dir = output.clone();
        }
        if let Some(locale) = self.locale {
            config.month_locale = locale;
        }
        if let Some(ref report) = self.report {
            config.report_file = Some(report.clone());
        }
        if self.no_preserve_mtime {
            config.preserve_mtime = false;
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}
