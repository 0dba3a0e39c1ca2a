//! Photo Organizer - sort pictures and media into a dated directory tree
//!
//! Copies every accepted file from the input directories into
//! `<output>/<year>/<month>.<month name>/<subfolder>`, skipping exact
//! duplicates and renaming clashes.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use photo_organizer::{Cli, Config, Organizer, OrganizerEvent, RunSummary};
use std::path::{Component, Path, PathBuf};
use tracing::{Level, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// CLI Output Module
mod cli_output {
    //! Console styling for progress and the completion summary.

    use crossterm::{
        ExecutableCommand,
        cursor::MoveToColumn,
        style::{Color, Print, Stylize, style},
        terminal::{Clear, ClearType},
    };
    use std::io::stdout;

    /// CLI theme colours
    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "─".repeat(60))));
    }

    /// Spaces that centre `title` in a 60-column banner
    pub fn title_padding(title: &str) -> usize {
        let width: usize = 60;
        (width.saturating_sub(title.len()) / 2).saturating_sub(1)
    }

    pub fn print_title(title: &str) {
        let left_pad = " ".repeat(title_padding(title));

        let _ = stdout().execute(Print(format!(
            "{}{} {}{}\n",
            left_pad,
            "╔".bold(),
            title.bold(),
            "╗".bold(),
        )));
        let _ = stdout().execute(Print("\n"));
    }

    /// Redraw the single progress line in place
    pub fn print_progress(percent: f64, label: &str) {
        let mut out = stdout();
        let _ = out.execute(MoveToColumn(0));
        let _ = out.execute(Clear(ClearType::CurrentLine));
        let _ = out.execute(Print(style(format!("{:>5.1}%", percent)).with(CliTheme::ACCENT).bold()));
        let _ = out.execute(Print(format!("  ({})", label)));
    }

    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_key_value(key: &str, value: &str, value_color: Option<Color>) {
        let key_styled = style(key).with(CliTheme::HINT);
        let value_styled = match value_color {
            Some(color) => style(value).with(color),
            None => style(value).bold(),
        };
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_stat(key: &str, value: &str, color: Color) {
        let key_styled = style(key).with(CliTheme::HINT);
        let value_styled = style(value).with(color).bold();
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_log_path(path: &str) {
        let _ = stdout().execute(Print("\n"));
        let _ = stdout().execute(Print(style("  Log file: ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", path)));
    }

    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_sample_config {
        print!("{}", Config::sample_config());
        return Ok(());
    }

    // Config and Log directories live next to the executable
    let exe_dir = get_executable_dir()?;
    let log_path = get_log_path(&exe_dir, &cli);

    // The config decides the log level, so it is read before logging starts
    let config = load_config(&cli, &exe_dir)?;
    let _guard = setup_logging(log_level(&cli, &config), cli.json_log, &log_path)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Photo Organizer starting");
    if let Some(ref config_path) = cli.config {
        let resolved_path = resolve_config_path(&exe_dir, config_path);
        info!(config_file = %resolved_path.display(), "Configuration read from file");
    }
    if config.verbose {
        info!(?config, "Configuration loaded");
    }
    info!(log_file = %log_path.display(), "Log file location");

    validate_config(&config)?;

    let report_file = config.report_file.clone();
    let handle = Organizer::new(config).spawn();

    // The worker owns the run; this thread only renders progress
    for event in handle.events() {
        match event {
            OrganizerEvent::Started { total } => {
                info!(total, "Organizing files");
            }
            OrganizerEvent::File { progress, .. } => {
                cli_output::print_progress(progress.percent(), &progress.label());
            }
            OrganizerEvent::Finished(_) => {
                cli_output::print_blank();
            }
        }
    }

    let summary = match handle.join() {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Processing failed");
            // Returning keeps `_guard` alive until the log is flushed
            return Err(anyhow::anyhow!("Processing failed: {}", e));
        }
    };

    print_summary(&summary);

    if let Some(path) = report_file {
        match summary.write_report(&path) {
            Ok(()) => info!(report = %path.display(), "Run report written"),
            Err(e) => warn!(report = %path.display(), error = %e, "Failed to write run report"),
        }
    }

    cli_output::print_separator();
    cli_output::print_log_path(&log_path.display().to_string());
    info!(log_file = %log_path.display(), "Processing complete. Log saved to");

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    use cli_output::*;

    print_separator();
    print_title("Organizing complete");
    print_separator();

    print_blank();
    print_stat("Copied", &summary.copied.to_string(), CliTheme::SUCCESS);
    print_stat("Duplicates", &summary.duplicates.to_string(), CliTheme::ACCENT);
    print_stat(
        "Unsupported",
        &summary.skipped_extension.to_string(),
        CliTheme::WARNING,
    );
    print_stat("Hidden", &summary.skipped_hidden.to_string(), CliTheme::WARNING);
    print_stat(
        "Missing folders",
        &summary.missing_directories.to_string(),
        CliTheme::WARNING,
    );
    print_stat("Invalid names", &summary.invalid_names.to_string(), CliTheme::ERROR);
    print_stat("Errors", &summary.errors.to_string(), CliTheme::ERROR);
    print_blank();

    if !summary.failures.is_empty() {
        print_separator();
        print_error(&format!("{} files could not be copied", summary.failures.len()));
        print_blank();
        for failure in &summary.failures {
            let reason = failure.reason.as_deref().unwrap_or(failure.outcome.as_str());
            print_key_value(
                &failure.source.display().to_string(),
                reason,
                Some(CliTheme::ERROR),
            );
        }
    }
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Determine the log file path based on config file or timestamp
fn get_log_path(exe_dir: &Path, cli: &Cli) -> PathBuf {
    let log_dir = exe_dir.join("Log");
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    if let Some(config_name) = cli.config_name() {
        let config_log_dir = log_dir.join(&config_name);
        let log_filename = format!("{}_{}.log", config_name, timestamp);
        config_log_dir.join(log_filename)
    } else {
        let log_filename = format!("CLIRun_{}.log", timestamp);
        log_dir.join(log_filename)
    }
}

/// Resolve config path - supports shorthand syntax
///
/// `family` finds `family.toml` in the working directory or in
/// `<exe dir>/Config/`.
fn resolve_config_path(exe_dir: &Path, config_path: &Path) -> PathBuf {
    if config_path.exists() {
        return config_path.to_path_buf();
    }

    let with_extension = if config_path.extension().is_none() {
        config_path.with_extension("toml")
    } else {
        config_path.to_path_buf()
    };

    if with_extension.exists() {
        return with_extension;
    }

    let config_dir = exe_dir.join("Config");
    let filename = config_path.file_name().unwrap_or(config_path.as_os_str());

    let mut in_config_dir = config_dir.join(filename);
    if in_config_dir.extension().is_none() {
        in_config_dir = in_config_dir.with_extension("toml");
    }

    if in_config_dir.exists() {
        return in_config_dir;
    }

    config_path.to_path_buf()
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli, exe_dir: &Path) -> Result<Config> {
    let config = if let Some(ref config_path) = cli.config {
        let resolved_path = resolve_config_path(exe_dir, config_path);
        let file_config = Config::load_from_file(&resolved_path)?;
        cli.merge_with_config(file_config)
    } else {
        cli.to_config()
    };

    if config.input_dirs.is_empty() {
        anyhow::bail!("No input directories given. Use --input or set input_dirs in the config file");
    }

    Ok(config)
}

/// `--verbose` on the command line or `verbose = true` in the config file
fn log_level(cli: &Cli, config: &Config) -> Level {
    if cli.verbose || config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Setup logging (file + console)
fn setup_logging(level: Level, json_log: bool, log_path: &Path) -> Result<WorkerGuard> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(guard)
}

/// Validate configuration before processing
fn validate_config(config: &Config) -> Result<()> {
    for input_dir in &config.input_dirs {
        if !input_dir.exists() {
            warn!(?input_dir, "Input directory does not exist, it will be skipped");
        }
    }

    // An output tree inside an input root would be walked again by the same run
    let output_dir = resolve_path(&config.output_dir);
    for input_dir in &config.input_dirs {
        if output_dir.starts_with(resolve_path(input_dir)) {
            anyhow::bail!(
                "Output directory {} is inside input directory {}",
                config.output_dir.display(),
                input_dir.display()
            );
        }
    }

    Ok(())
}

/// Absolute form of `path` with symlinks and `..` resolved.
///
/// The output directory usually does not exist yet, so the nearest existing
/// ancestor is canonicalized and the missing tail joined back on.
fn resolve_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut tail = Vec::new();
    let mut current = absolute.as_path();
    loop {
        if let Ok(mut resolved) = current.canonicalize() {
            for component in tail.iter().rev() {
                match component {
                    Component::ParentDir => {
                        resolved.pop();
                    }
                    Component::Normal(name) => resolved.push(name),
                    _ => {}
                }
            }
            return resolved;
        }

        let (Some(parent), Some(last)) = (current.parent(), current.components().next_back())
        else {
            return absolute;
        };
        tail.push(last);
        current = parent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn config_with(input: PathBuf, output: PathBuf) -> Config {
        Config {
            input_dirs: vec![input],
            output_dir: output,
            ..Config::default()
        }
    }

    #[test]
    fn test_title_padding_centres_short_titles() {
        assert_eq!(cli_output::title_padding("Organizing complete"), 19);
        assert_eq!(cli_output::title_padding(&"x".repeat(80)), 0);
    }

    #[test]
    fn test_config_verbose_raises_log_level() {
        let cli = Cli::parse_from(["photo-organizer"]);
        let mut config = Config::default();
        assert_eq!(log_level(&cli, &config), Level::INFO);

        config.verbose = true;
        assert_eq!(log_level(&cli, &config), Level::DEBUG);

        let cli = Cli::parse_from(["photo-organizer", "-v"]);
        assert_eq!(log_level(&cli, &Config::default()), Level::DEBUG);
    }

    #[test]
    fn test_sibling_output_is_accepted() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in");
        fs::create_dir(&input).unwrap();

        let config = config_with(input, dir.path().join("sorted"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_output_inside_input_via_parent_dir_is_rejected() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in");
        fs::create_dir_all(input.join("album")).unwrap();

        // in/album/../sorted does not exist yet but still lands inside `in`
        let output = input.join("album").join("..").join("sorted");
        assert!(validate_config(&config_with(input.clone(), output)).is_err());

        let output = dir.path().join("missing").join("..").join("in").join("sorted");
        assert!(validate_config(&config_with(input, output)).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_output_inside_input_via_symlink_is_rejected() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in");
        fs::create_dir(&input).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&input, &link).unwrap();

        let config = config_with(input, link.join("sorted"));
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_resolve_path_keeps_missing_tail() {
        let dir = tempdir().unwrap();
        let base = dir.path().canonicalize().unwrap();
        let resolved = resolve_path(&dir.path().join("a").join("b"));
        assert_eq!(resolved, base.join("a").join("b"));
    }
}
