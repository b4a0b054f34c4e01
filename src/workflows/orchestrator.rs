use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use super::advancer::WaveAdvancer;
use super::decision::Decision;
use super::recorder::ReviewRecorder;
use crate::errors::OrchestratorError;
use crate::state::{CurrentReview, FileStateStore, ReviewStatus, StateLock, StateStore, WorkflowState};

/// Applies review decisions to a persisted workflow as single transitions.
///
/// The stored document is rewritten only by the final `save`, after every
/// check has passed, so a failed call leaves it byte-for-byte unchanged.
pub struct Orchestrator<S: StateStore> {
    store: S,
    lock: Option<StateLock>,
    recorder: ReviewRecorder,
    advancer: WaveAdvancer,
}

impl Orchestrator<FileStateStore> {
    /// Orchestrator over a state file guarded by its sibling lock file.
    pub fn for_state_file(path: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        let path = path.into();
        let lock = StateLock::beside(&path, lock_timeout);
        Orchestrator::new(FileStateStore::new(path)).with_lock(lock)
    }
}

impl<S: StateStore> Orchestrator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            lock: None,
            recorder: ReviewRecorder::new(),
            advancer: WaveAdvancer::new(),
        }
    }

    pub fn with_lock(mut self, lock: StateLock) -> Self {
        self.lock = Some(lock);
        self
    }

    pub fn with_max_wave(mut self, max_wave: Option<u32>) -> Self {
        self.advancer = self.advancer.with_max_wave(max_wave);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record `decision` against `report_file` and advance the workflow.
    ///
    /// Input is validated before any I/O; a missing state document fails with
    /// `NotFound` before the lock file is created.
    pub fn apply_decision(
        &self,
        report_file: &str,
        decision: &str,
        now: DateTime<Utc>,
    ) -> Result<WorkflowState, OrchestratorError> {
        let decision: Decision = decision.parse()?;
        if report_file.trim().is_empty() {
            return Err(OrchestratorError::EmptyReportFile);
        }
        self.ensure_exists()?;

        self.exclusive(|| {
            let prior = self.store.load()?;
            let prior_wave = prior.current_wave;
            let next = self.transition(prior, report_file, decision, now)?;
            self.store.save(&next)?;

            info!(
                state_file = %self.store.location().display(),
                decision = %decision,
                report_file = report_file.trim(),
                from_wave = prior_wave,
                to_wave = next.current_wave,
                "Applied review decision"
            );
            Ok(next)
        })
    }

    /// The in-memory part of `apply_decision`: record, then advance.
    pub fn transition(
        &self,
        state: WorkflowState,
        report_file: &str,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> Result<WorkflowState, OrchestratorError> {
        let state = self.recorder.record(state, report_file, decision, now)?;
        self.advancer.advance(state, decision)
    }

    /// Begin a new review cycle by resetting `current_review` to PENDING.
    ///
    /// Carried keys on an existing review record are kept. A review that is
    /// already pending is left as is and nothing is written.
    pub fn open_review(&self) -> Result<WorkflowState, OrchestratorError> {
        self.ensure_exists()?;

        self.exclusive(|| {
            let mut state = self.store.load()?;
            match state.current_review.as_mut() {
                Some(review) if review.status == ReviewStatus::Pending => {
                    info!(wave = state.current_wave, "Review already pending");
                    return Ok(state);
                }
                Some(review) => {
                    review.status = ReviewStatus::Pending;
                    review.completed_at = None;
                    review.decision = None;
                }
                None => state.current_review = Some(CurrentReview::pending()),
            }

            self.store.save(&state)?;
            info!(wave = state.current_wave, "Opened review cycle");
            Ok(state)
        })
    }

    /// Current state, read without taking the lock.
    pub fn status(&self) -> Result<WorkflowState, OrchestratorError> {
        self.store.load()
    }

    fn ensure_exists(&self) -> Result<(), OrchestratorError> {
        if self.store.exists() {
            Ok(())
        } else {
            warn!(state_file = %self.store.location().display(), "No workflow state to update");
            Err(OrchestratorError::NotFound {
                path: self.store.location(),
            })
        }
    }

    fn exclusive<T, F>(&self, f: F) -> Result<T, OrchestratorError>
    where
        F: FnOnce() -> Result<T, OrchestratorError>,
    {
        match &self.lock {
            Some(lock) => lock.with_exclusive(f),
            None => f(),
        }
    }
}
