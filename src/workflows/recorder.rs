use chrono::{DateTime, SubsecRound, Utc};
use serde_yaml::Mapping;
use tracing::debug;

use super::decision::Decision;
use crate::errors::OrchestratorError;
use crate::state::{ReviewStatus, WaveReview, WorkflowState};

/// Stamps a review decision onto `wave_review` and `current_review`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReviewRecorder;

impl ReviewRecorder {
    pub fn new() -> Self {
        Self
    }

    /// Record `decision` for `report_file` at `now`.
    ///
    /// Only `wave_review` and `current_review` change. `current_review` is
    /// updated when present and never created. Fails with `StaleReview` when
    /// the current review was already approved by an earlier call.
    ///
    /// Both `decision` fields receive the canonical lower-case token
    /// (`approve` / `reject`), not the caller's spelling, so `APPROVED` is
    /// stored as `approve`. `now` is truncated to microseconds, the precision
    /// the state document is written with.
    pub fn record(
        &self,
        mut state: WorkflowState,
        report_file: &str,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> Result<WorkflowState, OrchestratorError> {
        let report_file = report_file.trim();
        if report_file.is_empty() {
            return Err(OrchestratorError::EmptyReportFile);
        }

        if let Some(review) = &state.current_review {
            if review.status == ReviewStatus::Approved {
                return Err(OrchestratorError::StaleReview {
                    wave: state.current_wave,
                });
            }
        }

        let now = now.trunc_subsecs(6);
        let wave_review = state.wave_review.get_or_insert_with(|| WaveReview {
            report_file: String::new(),
            decision: String::new(),
            reviewed_at: now,
            extra: Mapping::new(),
        });
        wave_review.report_file = report_file.to_string();
        wave_review.decision = decision.as_str().to_string();
        wave_review.reviewed_at = now;

        if let Some(review) = state.current_review.as_mut() {
            review.status = decision.review_status();
            review.completed_at = Some(now);
            review.decision = Some(decision.as_str().to_string());
        }

        debug!(
            wave = state.current_wave,
            report_file,
            decision = %decision,
            "Recorded review decision"
        );
        Ok(state)
    }
}
