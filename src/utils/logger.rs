use std::fs::{self, File};
use std::path::{Path, PathBuf};
use env_logger::{Builder, Target};
use log::LevelFilter;
use crate::error::Result;

/// Maps a configured level name to a filter. Unknown names yield `None`.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.to_lowercase().as_str() {
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        "none" | "off" => Some(LevelFilter::Off),
        _ => None,
    }
}

/// Log file for a run started now: `<dir>/compare_hashes_<month>_<day>_<hour>_<minute>.log`.
pub fn log_file_path(dir: &Path) -> PathBuf {
    let timestamp = chrono::Local::now().format("%m_%d_%H_%M");
    dir.join(format!("compare_hashes_{}.log", timestamp))
}

/// Installs the global logger. Logs go to stderr unless `log_dir` is given.
pub fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<LevelFilter> {
    let filter = parse_level(level).unwrap_or_else(|| {
        eprintln!("Invalid log level '{}', defaulting to Info", level);
        LevelFilter::Info
    });

    let mut builder = Builder::new();
    builder.filter(None, filter);
    if let Some(dir) = log_dir {
        fs::create_dir_all(dir)?;
        let log_file = File::create(log_file_path(dir))?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }
    // A second initialisation (tests, embedding) keeps the first logger.
    let _ = builder.try_init();
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_level_names() {
        assert_eq!(parse_level("DEBUG"), Some(LevelFilter::Debug));
        assert_eq!(parse_level("none"), Some(LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn log_file_lives_in_the_given_directory() {
        let path = log_file_path(Path::new("logs"));
        assert_eq!(path.parent(), Some(Path::new("logs")));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("compare_hashes_") && name.ends_with(".log"));
    }
}
