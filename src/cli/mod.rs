use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "wave-orchestrator")]
#[command(about = "Record wave review decisions and advance the orchestrator state")]
#[command(long_about = "wave-orchestrator keeps the persisted orchestrator state of a multi-wave \
                       build/review pipeline. Record a review with 'wave-orchestrator review <REPORT> approve' \
                       to move the workflow to its next wave.")]
pub struct Cli {
    /// State document to read and rewrite (overrides state.file_path)
    #[arg(long, global = true, help = "Path to the orchestrator state document")]
    pub state_file: Option<PathBuf>,

    /// Final wave of the workflow (overrides workflow.max_wave)
    #[arg(long, global = true, help = "Refuse to advance past this wave")]
    pub max_wave: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a review decision and advance the workflow on approval
    Review {
        /// Artifact that was reviewed
        #[arg(help = "Report identifier, e.g. wave1-report.json")]
        report_file: String,
        /// Review outcome
        #[arg(help = "Decision token: approve or reject")]
        decision: String,
    },
    /// Start a new review cycle for the current wave
    OpenReview,
    /// Show the current wave, state machine position and review records
    Status {
        /// Print the state as JSON
        #[arg(long, help = "Emit machine-readable JSON instead of text")]
        json: bool,
    },
}
