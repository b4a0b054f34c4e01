use std::path::PathBuf;
use std::time::Duration;

use crate::config::WaveOrchestratorConfig;
use crate::state::FileStateStore;
use crate::workflows::Orchestrator;

pub mod open_review;
pub mod review;
pub mod status;

/// Settings shared by every command once config and CLI flags are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandContext {
    pub state_file: PathBuf,
    pub max_wave: Option<u32>,
    pub lock_timeout: Duration,
}

impl CommandContext {
    /// CLI flags take precedence over configuration.
    pub fn resolve(config: &WaveOrchestratorConfig, state_file: Option<PathBuf>, max_wave: Option<u32>) -> Self {
        Self {
            state_file: state_file.unwrap_or_else(|| config.state.file_path.clone()),
            max_wave: max_wave.or(config.workflow.max_wave),
            lock_timeout: config.state.lock_timeout(),
        }
    }

    pub fn orchestrator(&self) -> Orchestrator<FileStateStore> {
        Orchestrator::for_state_file(&self.state_file, self.lock_timeout).with_max_wave(self.max_wave)
    }
}
