//! CLI front end (spec §6): parses arguments, wires up tracing, and
//! delegates the actual work to `packetc::generate`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Generates target-language bindings from `.packet` descriptions.
#[derive(Parser, Debug)]
#[command(name = "packetc", version, about)]
struct Args {
    /// Emitter id, e.g. "cpp" or "go".
    #[arg(short = 'l', long = "lang")]
    lang: String,

    /// Output directory for generated files.
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Colon-separated search path for `.packet` includes. Falls back to
    /// `PACKET_PATH`, then the current directory.
    #[arg(short = 'p', long = "packetpath")]
    packetpath: Option<String>,

    /// Also generate code for every transitively imported `.packet`.
    #[arg(short = 'r', long = "recursive")]
    recursive: bool,

    /// Raise logging verbosity.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// One or more `.packet` input files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).without_time().init();
}

fn run(args: Args) -> anyhow::Result<()> {
    for input in &args.inputs {
        packetc::generate(input, &args.lang, args.packetpath.as_deref(), &args.output, args.recursive)
            .with_context(|| format!("generating {} for {}", args.lang, input.display()))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("packetc: {err:#}");
            ExitCode::FAILURE
        }
    }
}
