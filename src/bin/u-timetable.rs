use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use u_timetable::{
    Algorithm, EngineConfig, GenerateRequest, TimetableEngine, ValidateRequest,
};

#[derive(Parser, Debug)]
#[command(name = "u-timetable", version, about = "University timetable generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Pretty-print the result JSON
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a timetable from a request file
    Generate {
        /// Generate request (JSON)
        request: PathBuf,

        /// Engine configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Algorithm to run; repeat to run an ensemble
        #[arg(long = "algorithm", short = 'a')]
        algorithms: Vec<Algorithm>,

        /// Run every algorithm and keep the best result
        #[arg(long)]
        ensemble: bool,
    },
    /// Check a hand-built schedule against its catalog
    Validate {
        /// Validate request (JSON)
        request: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            request,
            config,
            algorithms,
            ensemble,
        } => {
            let config = match config {
                Some(path) => EngineConfig::from_json(&read(&path)?)
                    .with_context(|| format!("failed to parse config {}", path.display()))?,
                None => EngineConfig::default(),
            };
            let mut request = GenerateRequest::from_json(&read(&request)?)
                .with_context(|| format!("failed to parse request {}", request.display()))?;

            let engine = TimetableEngine::new(config);
            let result = if ensemble || algorithms.len() > 1 {
                let algorithms = if algorithms.is_empty() {
                    Algorithm::ALL.to_vec()
                } else {
                    algorithms
                };
                info!(?algorithms, "running ensemble");
                engine.generate_ensemble(request, &algorithms)?
            } else {
                if let Some(&algorithm) = algorithms.first() {
                    request.algorithm = algorithm;
                }
                engine.generate(request)?
            };
            print(&result, cli.pretty)
        }
        Command::Validate { request } => {
            let request = ValidateRequest::from_json(&read(&request)?)
                .with_context(|| format!("failed to parse request {}", request.display()))?;
            let result = TimetableEngine::default().validate(request)?;
            print(&result, cli.pretty)
        }
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
