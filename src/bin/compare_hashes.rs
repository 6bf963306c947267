use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{info, error};
use lichen::{run, LichenConfig, RunOptions};
use lichen::utils::init_logging;

/// Compare fingerprinted submissions of one gradeable and rank them by
/// suspicious overlap.
#[derive(Debug, Parser)]
#[command(name = "compare_hashes", version)]
struct Args {
    /// Gradeable directory holding config.json and users/
    gradeable_root: PathBuf,

    /// Engine settings (default: <gradeable_root>/lichen_config.json if present)
    #[arg(long)]
    lichen_config: Option<PathBuf>,

    /// Process submissions in parallel with rayon
    #[arg(long)]
    rayon: bool,

    /// error, warn, info, debug, trace or none
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write the log to a timestamped file in this directory instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Do not draw the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(&args.log_level, args.log_dir.as_deref()) {
        eprintln!("Unable to set up logging: {}", e);
        return ExitCode::from(2);
    }

    let config = match LichenConfig::load(&args.gradeable_root, args.lichen_config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR with {:?}: {}", args.gradeable_root, e);
            return ExitCode::from(2);
        }
    };
    info!("Comparing {} (hash_size {}, threshold {})",
          config.gradeable.source_label(), config.gradeable.hash_size, config.gradeable.threshold);

    let options = RunOptions {
        parallel: args.rayon || config.engine.parallel,
        show_progress: !args.no_progress,
    };

    match run(&args.gradeable_root, &config, &options) {
        Ok(summary) if summary.is_success() => {
            println!("Compared {} submissions, {} with suspicious matches",
                     summary.submissions, summary.with_matches);
            ExitCode::SUCCESS
        }
        Ok(summary) => {
            for failure in &summary.output_failures {
                eprintln!("{}", failure);
            }
            error!("{} output failures", summary.output_failures.len());
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ExitCode::from(2)
        }
    }
}
