// Typed records for the persisted orchestrator state document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

/// Value written to `state_machine.next_state` once a wave is approved.
pub const WAVE_START: &str = "WAVE_START";

/// Root of the orchestrator state document.
///
/// Keys the schema does not name are kept in `extra`. `FileStateStore::save`
/// restores the document's original key order when writing back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub current_wave: u32,
    pub state_machine: StateMachineState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_review: Option<CurrentReview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave_review: Option<WaveReview>,
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Position of the driving automaton and the transition it takes next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMachineState {
    pub current_state: String,
    pub next_state: String,
    pub next_action: String,
    #[serde(flatten)]
    pub extra: Mapping,
}

/// The review in progress for the active wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentReview {
    pub status: ReviewStatus,
    #[serde(default, with = "super::timestamp::option")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl CurrentReview {
    pub fn pending() -> Self {
        Self {
            status: ReviewStatus::Pending,
            completed_at: None,
            decision: None,
            extra: Mapping::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "PENDING",
            ReviewStatus::Approved => "APPROVED",
            ReviewStatus::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of the most recently processed review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveReview {
    pub report_file: String,
    pub decision: String,
    #[serde(with = "super::timestamp")]
    pub reviewed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl WorkflowState {
    /// A fresh state at `wave` with a pending review and no history.
    pub fn at_wave(wave: u32, current_state: &str) -> Self {
        Self {
            current_wave: wave,
            state_machine: StateMachineState {
                current_state: current_state.to_string(),
                next_state: String::new(),
                next_action: String::new(),
                extra: Mapping::new(),
            },
            current_review: Some(CurrentReview::pending()),
            wave_review: None,
            extra: Mapping::new(),
        }
    }

    /// Checks the constraints serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.current_wave == 0 {
            return Err("current_wave must be >= 1".to_string());
        }
        Ok(())
    }
}
