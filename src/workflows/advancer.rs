use tracing::info;

use super::decision::Decision;
use crate::errors::OrchestratorError;
use crate::state::{WorkflowState, WAVE_START};

/// Moves the workflow to the next wave once a review is approved.
#[derive(Debug, Default, Clone, Copy)]
pub struct WaveAdvancer {
    max_wave: Option<u32>,
}

impl WaveAdvancer {
    pub fn new() -> Self {
        Self { max_wave: None }
    }

    /// Refuse to advance past `max_wave`.
    pub fn with_max_wave(mut self, max_wave: Option<u32>) -> Self {
        self.max_wave = max_wave;
        self
    }

    /// Advance on approval; a rejection returns `state` untouched so the
    /// caller can run another review cycle on the same wave.
    pub fn advance(&self, mut state: WorkflowState, decision: Decision) -> Result<WorkflowState, OrchestratorError> {
        if !decision.is_approval() {
            return Ok(state);
        }

        let current_wave = state.current_wave;
        if let Some(max_wave) = self.max_wave {
            if current_wave >= max_wave {
                return Err(OrchestratorError::WorkflowComplete { current_wave, max_wave });
            }
        }
        let next_wave = current_wave
            .checked_add(1)
            .ok_or(OrchestratorError::WorkflowComplete {
                current_wave,
                max_wave: u32::MAX,
            })?;

        state.state_machine.next_state = WAVE_START.to_string();
        state.state_machine.next_action = format!("Start Wave {next_wave} implementation");
        state.current_wave = next_wave;

        info!(from_wave = current_wave, to_wave = next_wave, "Advanced workflow to next wave");
        Ok(state)
    }
}
