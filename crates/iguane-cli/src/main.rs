use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// Top-level CLI argument parser for the `iguane` command
#[derive(Parser)]
#[command(
    name = "iguane",
    about = "iguane: figures of merit for heterogeneous GPU clusters",
    version
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `iguane` CLI
#[derive(Subcommand)]
enum Commands {
    /// Score GPUs with a figure of merit
    Score {
        /// GPU names (exact match); all GPUs when omitted
        gpus: Vec<String>,
        /// Figure of merit to compute (see `list-fom`)
        #[arg(short, long)]
        fom: Option<String>,
        /// UGR weight-set version
        #[arg(long)]
        ugr_version: Option<String>,
        /// Alternative GPU data file (.txt record format or .json)
        #[arg(long)]
        data: Option<PathBuf>,
        /// YAML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print a JSON object instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the available figures of merit
    ListFom,
    /// List the GPUs in the data file
    ListGpu {
        /// Alternative GPU data file
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Show the hardware record of one GPU as JSON
    Show {
        /// GPU name (exact match)
        gpu: String,
        /// Alternative GPU data file
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Check a GPU data file for problems the formulas would hit
    Validate {
        /// Alternative GPU data file
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Convert a GPU data file to JSON
    Convert {
        /// Input data file
        input: PathBuf,
        /// Output path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Dispatch a parsed CLI subcommand to its handler
fn run_command(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Score {
            gpus,
            fom,
            ugr_version,
            data,
            config,
            json,
        } => commands::score::run(&commands::score::ScoreOptions {
            gpus,
            fom,
            ugr_version,
            data,
            config,
            json,
        }),
        Commands::ListFom => commands::list::run_fom(),
        Commands::ListGpu { data } => commands::list::run_gpu(data.as_deref()),
        Commands::Show { gpu, data } => commands::show::run(&gpu, data.as_deref()),
        Commands::Validate { data } => commands::validate::run(data.as_deref()),
        Commands::Convert { input, output } => commands::convert::run(&input, output.as_deref()),
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point: parse CLI arguments and run the selected subcommand
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run_command(cli.command) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
