//! Binary entry point for the `nexema` CLI.
//!
//! ```bash
//! nexema build ./schemas ./out
//! nexema generate ./schemas ./out --snapshot ./out/shapes.nexs
//! nexema clear ./out
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use nexema::builder::{clear_snapshots, Builder};
use nexema::error::NexemaError;

/// Schema compiler for the Nexema binary interchange IDL.
#[derive(Parser)]
#[command(name = "nexema", version, about = "Build and generate code from .nex schemas")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Parse and analyze a project, writing a snapshot file on success.
    Build { input_dir: PathBuf, output_dir: PathBuf },
    /// Build (or reuse a snapshot) and run every generator in the manifest.
    Generate {
        input_dir: PathBuf,
        output_dir: PathBuf,
        /// Reuse an already-built snapshot instead of the one just computed.
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Remove every snapshot file under a directory (default: current directory).
    Clear { path: Option<PathBuf> },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.log_level);

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code().code())
        }
    }
}

fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn execute(command: Command) -> Result<(), NexemaError> {
    match command {
        Command::Build { input_dir, output_dir } => execute_build(&input_dir, &output_dir),
        Command::Generate {
            input_dir,
            output_dir,
            snapshot,
        } => execute_generate(&input_dir, &output_dir, snapshot.as_deref()),
        Command::Clear { path } => execute_clear(path.as_deref()),
    }
}

fn execute_build(input_dir: &std::path::Path, output_dir: &std::path::Path) -> Result<(), NexemaError> {
    let mut builder = Builder::new();
    builder.build(input_dir)?;
    report_diagnostics(&builder)?;

    let path = builder.snapshot(output_dir)?;
    println!("wrote snapshot to {}", path.display());
    Ok(())
}

fn execute_generate(
    input_dir: &std::path::Path,
    output_dir: &std::path::Path,
    snapshot: Option<&std::path::Path>,
) -> Result<(), NexemaError> {
    let mut builder = Builder::new();
    builder.build(input_dir)?;
    if snapshot.is_none() {
        report_diagnostics(&builder)?;
    }

    builder.generate(output_dir, snapshot)?;
    println!("source has been generated successfully to {}", output_dir.display());
    Ok(())
}

fn execute_clear(path: Option<&std::path::Path>) -> Result<(), NexemaError> {
    let root = match path {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().map_err(|source| NexemaError::CurrentDir { source })?,
    };

    let cleared = clear_snapshots(&root)?;
    println!("cleared {cleared} snapshot file(s)");
    Ok(())
}

fn report_diagnostics(builder: &Builder) -> Result<(), NexemaError> {
    let diagnostics = builder.diagnostics();
    if diagnostics.is_empty() {
        return Ok(());
    }
    for diagnostic in diagnostics.sorted() {
        eprintln!("{diagnostic}");
    }
    Err(NexemaError::Diagnostics { count: diagnostics.len() })
}
