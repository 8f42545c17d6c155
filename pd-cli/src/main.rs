//! Patch-directed differential symbolic execution harness: computes
//! instruction priorities from a static bitcode diff, drives the executor
//! toward changed code, and replays every test it emits on both program
//! versions.

use clap::Parser;
use std::path::PathBuf;

mod commands;
mod config;
mod ir;

use commands::run;

/// Directs a symbolic executor at changed code and diffs its replayed tests.
#[derive(Parser)]
#[command(name = "pd-compare")]
#[command(about = "Directs a symbolic executor at changed code and replays its tests on both program versions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Patched (target) bitcode module, forwarded to the executor.
    #[arg(long)]
    patched: PathBuf,

    /// Loaded-IR JSON sidecar for the patched module, read by the analyzer.
    #[arg(long)]
    patched_ir: PathBuf,

    /// Original (comparison) bitcode module, forwarded to the executor.
    #[arg(long)]
    original: PathBuf,

    /// Loaded-IR JSON sidecar for the original module.
    #[arg(long)]
    original_ir: PathBuf,

    /// Executor libc model (passed through as `--libc=`).
    #[arg(long, default_value = "klee")]
    libc: String,

    /// Directory under which `out-N/` campaign output is created.
    #[arg(long, default_value = ".")]
    output_root: PathBuf,

    /// Well-known scratch path the replay-side POSIX model dumps to.
    #[arg(long)]
    dump_scratch_path: Option<PathBuf>,

    /// Enable verbose (debug) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all but error logging.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Arguments forwarded to the program under the executor.
    program_args: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if cli.quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    pd_process::initialize()?;

    run::execute(
        cli.patched,
        cli.patched_ir,
        cli.original,
        cli.original_ir,
        cli.libc,
        cli.output_root,
        cli.dump_scratch_path,
        cli.program_args,
    )
}
