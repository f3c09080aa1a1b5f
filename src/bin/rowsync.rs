//! Rowsync CLI
//!
//! Commands:
//! - sync: discover both devices' recordings in a directory, align them,
//!   and write the CSV session report
//! - inspect: load one recording and print its lap/trackpoint tables

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rowsync::{
    discover::discover, report, sync_session, system_timezone, SyncError, ROWSYNC_VERSION,
};

/// Rowsync - merge rowing-machine and wrist telemetry into one timeline
#[derive(Parser)]
#[command(name = "rowsync")]
#[command(version = ROWSYNC_VERSION)]
#[command(about = "Align and merge TCX recordings from two devices", long_about = None)]
struct Cli {
    /// Target timezone (IANA name, e.g. "Europe/Rome"); defaults to the
    /// system zone
    #[arg(long, global = true)]
    timezone: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover, align, and merge one session directory
    Sync {
        /// Directory holding both devices' recordings
        #[arg(short, long)]
        dir: PathBuf,

        /// Filename prefix of the wrist recordings
        #[arg(long, default_value = "activity")]
        wrist_prefix: String,

        /// Filename prefix of the rowing-machine recordings
        #[arg(long, default_value = "concept2")]
        erg_prefix: String,

        /// Output directory for the CSV report
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Load one recording and print its tables
    Inspect {
        /// TCX file to load
        file: PathBuf,

        /// Dump the full tables as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SyncError> {
    let tz = match &cli.timezone {
        Some(name) => name
            .parse()
            .map_err(|_| SyncError::UnknownTimezone(name.clone()))?,
        None => system_timezone()?,
    };

    match cli.command {
        Commands::Sync {
            dir,
            wrist_prefix,
            erg_prefix,
            out,
        } => {
            let wrist_files = discover(&dir, &wrist_prefix)?;
            let erg_files = discover(&dir, &erg_prefix)?;
            let alignment = sync_session(&wrist_files, &erg_files, tz)?;
            info!(
                offset_seconds = alignment.offset.num_seconds(),
                merged_rows = alignment.merged.len(),
                "session aligned"
            );
            report::write_csv(&alignment, &out)?;
            println!(
                "wrote {} merged rows (offset {} s) to {}",
                alignment.merged.len(),
                alignment.offset.num_seconds(),
                out.display()
            );
            Ok(())
        }

        Commands::Inspect { file, json } => {
            let (laps, points) = rowsync::load_activity(&file, tz)?;
            if json {
                let dump = serde_json::json!({
                    "laps": laps,
                    "trackpoints": points,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&dump)
                        .unwrap_or_else(|_| "{}".to_string())
                );
            } else {
                println!("{}: {} laps, {} trackpoints", file.display(), laps.len(), points.len());
                for lap in &laps {
                    println!(
                        "  lap {} start {} distance {}",
                        lap.number,
                        lap.start_time,
                        lap.distance
                            .map(|d| format!("{d} m"))
                            .unwrap_or_else(|| "-".to_string())
                    );
                }
            }
            Ok(())
        }
    }
}
