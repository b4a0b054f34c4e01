use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use wave_orchestrator::cli::commands::open_review::OpenReviewCommand;
use wave_orchestrator::cli::commands::review::ReviewCommand;
use wave_orchestrator::cli::commands::status::StatusCommand;
use wave_orchestrator::cli::commands::CommandContext;
use wave_orchestrator::cli::{Cli, Commands};
use wave_orchestrator::{init_telemetry, OrchestratorError, WaveOrchestratorConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {e}");
            match e.downcast_ref::<OrchestratorError>() {
                Some(err) => {
                    eprintln!();
                    eprintln!("🔧 QUICK FIXES:");
                    for fix in err.quick_fixes() {
                        eprintln!("   → {fix}");
                    }
                    ExitCode::from(err.exit_code())
                }
                None => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // .env is optional; a malformed one is ignored
    let _ = WaveOrchestratorConfig::load_env_file();
    let config = WaveOrchestratorConfig::load()?;
    init_telemetry(&config.observability)?;

    let context = CommandContext::resolve(&config, cli.state_file, cli.max_wave);

    match cli.command {
        Commands::Review { report_file, decision } => ReviewCommand::new(report_file, decision, context).execute(),
        Commands::OpenReview => OpenReviewCommand::new(context).execute(),
        Commands::Status { json } => StatusCommand::new(context).with_json(json).execute(),
    }
}
