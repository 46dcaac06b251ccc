//! carton-labels - one PDF label per carton from a semicolon CSV file
//!
//! Labels are written to the current directory. Custom fonts are picked up
//! from `Fonts/` next to the executable or in the current directory.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use label::{LabelBatch, LabelFonts, LabelRenderer, LayoutGeometry};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: carton-labels <path-to-csv>";

#[derive(Parser, Debug)]
#[command(
    about = "Generate one PDF shipping label per carton from a semicolon-separated CSV file",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Args {
    /// Path to the CSV file
    csv_path: PathBuf,

    /// Further arguments are accepted and ignored
    #[arg(hide = true)]
    _ignored: Vec<OsString>,
}

fn main() -> ExitCode {
    init_logging();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            eprintln!("[ERROR] No CSV file provided.");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("[ERROR] {e}");
            return ExitCode::FAILURE;
        }
    };

    if !args.csv_path.is_file() {
        eprintln!("[ERROR] CSV file not found: {}", args.csv_path.display());
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    }

    match run(&args.csv_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[ERROR] {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(csv_path: &Path) -> Result<()> {
    let fonts = LabelFonts::resolve_from(&font_search_dirs());
    let renderer = LabelRenderer::new(LayoutGeometry::a4(), fonts);
    let out_dir = std::env::current_dir().context("Failed to determine the current directory")?;

    let batch = LabelBatch::from_path(csv_path)
        .with_context(|| format!("Failed to read {}", csv_path.display()))?;
    let summary = batch
        .run(|record| renderer.write_to(&out_dir, record).map(|_| ()))
        .context("Failed to generate labels")?;

    info!(rows = summary.rows, labels = summary.labels, "done");
    Ok(())
}

/// Executable directory first, then the current directory
fn font_search_dirs() -> Vec<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let cwd = std::env::current_dir().ok();

    exe_dir.into_iter().chain(cwd).collect()
}
