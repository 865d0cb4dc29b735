mod classify;
mod commands;
mod config;
mod diagnostics;
mod discovery;
mod error;
mod extract;
mod fingerprint;
mod paths;
mod render;
mod toc;
mod toctree;
mod types;
mod watch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

/// Environment variable holding an `env_logger` filter; overrides `-v`.
const LOG_ENV: &str = "DOCFORGE_LOG";

#[derive(Parser)]
#[command(
    name = "docforge",
    version,
    about = "Discover Sphinx documentation sources and reconcile them into a table of contents"
)]
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
    /// More log output: -v for info, -vv for debug.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Report orphans not reached by any toctree, and broken toctree entries
    Check {
        /// Documentation root; located from the working directory if omitted.
        docs_dir: Option<PathBuf>,
    },
    /// Discover documentation files and dump the corpus
    Discover {
        /// Documentation root; located from the working directory if omitted.
        docs_dir: Option<PathBuf>,
        /// Output format: json, yaml, or text.
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Reconcile discovered and orphaned files into a table of contents
    Toc {
        /// Documentation root; located from the working directory if omitted.
        docs_dir: Option<PathBuf>,
        /// Output format: json, yaml, or text.
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Leave files already listed in a hand-written toctree out of orphan placement.
        #[arg(long)]
        respect_toctrees: bool,
    },
    /// Run check, then re-run it whenever documentation sources change
    Watch {
        /// Documentation root; located from the working directory if omitted.
        docs_dir: Option<PathBuf>,
    },
}

/// Set up `env_logger` once. `DOCFORGE_LOG` wins over the verbosity flag.
fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, default_filter))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check { docs_dir } => commands::check(docs_dir.as_deref()),
        Commands::Discover { docs_dir, format, output } => {
            commands::discover(docs_dir.as_deref(), output.as_deref(), &format).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Toc { docs_dir, format, output, respect_toctrees } => {
            commands::toc(docs_dir.as_deref(), output.as_deref(), &format, respect_toctrees)
                .map(|()| return ExitCode::SUCCESS)
        },
        Commands::Watch { docs_dir } => watch::run(docs_dir.as_deref()),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3_u8)
        },
    };
}
