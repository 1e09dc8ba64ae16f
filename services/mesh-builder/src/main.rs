//! Environmental mesh builder.
//!
//! Builds a non-uniform mesh from a configuration file, compares meshes
//! for regression testing and summarises persisted meshes.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mesh_builder::commands;

#[derive(Parser, Debug)]
#[command(name = "mesh-builder")]
#[command(about = "Build, compare and inspect environmental meshes")]
struct Args {
    /// Log level (overridden by RUST_LOG when set)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a mesh from a YAML or JSON configuration
    Build {
        /// Configuration file path
        #[arg(short, long, env = "MESH_CONFIG")]
        config: PathBuf,

        /// Output mesh file
        #[arg(short, long, default_value = "mesh.json")]
        output: PathBuf,
    },

    /// Compare a mesh against a reference mesh
    Compare {
        /// Reference mesh
        expected: PathBuf,

        /// Mesh under test
        actual: PathBuf,
    },

    /// Print a summary of a persisted mesh
    Inspect {
        /// Mesh file
        mesh: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        as_json: bool,
    },
}

fn main() -> Result<ExitCode> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json)?;

    match args.command {
        Command::Build { config, output } => {
            info!(config = %config.display(), "Starting mesh build");
            let summary = commands::build(&config, &output)?;
            println!("{}", summary);
        }
        Command::Compare { expected, actual } => {
            let report = commands::compare(&expected, &actual)?;
            println!("{}", report);
            if !report.is_match() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Inspect { mesh, as_json } => {
            let summary = commands::inspect(&mesh)?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", summary);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from_level(level).into()));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}
