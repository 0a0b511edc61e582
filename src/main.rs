use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use clap::Parser;

use nose2pytest::config::{ConvertOptions, PlacesPolicy};
use nose2pytest::diff::line_diff;
use nose2pytest::driver::convert_paths;
use nose2pytest::logging::init_logger;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "nose2pytest",
    version,
    about = "Convert nose assertion calls into plain assert statements for use with pytest."
)]
struct Args {
    /// Files or directories to convert; directories are searched recursively for .py files.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Report what would change without overwriting any file.
    #[arg(short = 'w', long = "no-write")]
    no_write: bool,

    /// List every changed file.
    #[arg(short, long)]
    verbose: bool,

    /// Print a line diff of every changed file.
    #[arg(long)]
    diff: bool,

    /// Handling of `places` precision arguments (overridden by NOSE2PYTEST_PLACES).
    #[arg(long, value_parser = ["skip", "tolerance"])]
    places: Option<String>,

    /// Number of worker threads.
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Log level for stderr output (otherwise RUST_LOG, else "info").
    #[arg(long)]
    log_level: Option<String>,

    /// Also write debug logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Disable ANSI colors in log output.
    #[arg(long)]
    no_color: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the conversion; `Ok(false)` when some file failed.
fn run(args: Args) -> Result<bool> {
    let _guard = init_logger(args.no_color, args.log_level.as_deref(), args.log_file.as_deref())
        .context("failed to initialise logging")?;

    let options = ConvertOptions {
        places: PlacesPolicy::from_env_or_default(args.places.as_deref()),
        write: !args.no_write,
        jobs: args.jobs,
        ..ConvertOptions::default()
    };
    let cancel = AtomicBool::new(false);
    let summary = convert_paths(&args.paths, &options, &cancel).context("conversion aborted")?;

    for report in summary.reports.iter().filter(|report| report.changed()) {
        if args.verbose {
            println!(
                "{}: {} converted, {} left",
                report.path.display(),
                report.rewrite.converted,
                report.rewrite.skipped.len()
            );
        }
        if args.diff {
            print!("{}", line_diff(&report.path.display().to_string(), &report.original, &report.rewrite.text));
        }
    }

    println!(
        "{} file(s) {}, {} unchanged, {} failed; {} assertion(s) converted, {} left unconverted",
        summary.converted_files(),
        if options.write { "converted" } else { "would change" },
        summary.unchanged_files(),
        summary.failed_files(),
        summary.converted_sites(),
        summary.skipped_sites()
    );
    Ok(summary.is_success())
}
