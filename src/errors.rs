use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, transforming or persisting workflow state.
///
/// Every variant is detected before the state document is rewritten, so a
/// caller that sees one of these can rely on the durable state being the
/// same as before the call.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("no workflow state found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("workflow state at {} is corrupt: {reason}", path.display())]
    CorruptState { path: PathBuf, reason: String },

    #[error("invalid decision '{token}': expected one of approve, reject")]
    InvalidDecision { token: String },

    #[error("report file must not be empty")]
    EmptyReportFile,

    #[error("workflow complete: wave {current_wave} is the final wave (max {max_wave})")]
    WorkflowComplete { current_wave: u32, max_wave: u32 },

    #[error("review for wave {wave} is already approved")]
    StaleReview { wave: u32 },

    #[error("timed out after {waited_ms}ms waiting for lock {}", path.display())]
    LockTimeout { path: PathBuf, waited_ms: u64 },

    #[error("I/O failure during {operation} of {}: {source}", path.display())]
    IoFailure {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OrchestratorError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OrchestratorError::IoFailure {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error kind. 2 is left to clap usage errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            OrchestratorError::NotFound { .. } => 3,
            OrchestratorError::CorruptState { .. } => 4,
            OrchestratorError::InvalidDecision { .. } | OrchestratorError::EmptyReportFile => 5,
            OrchestratorError::WorkflowComplete { .. } => 6,
            OrchestratorError::StaleReview { .. } => 7,
            OrchestratorError::LockTimeout { .. } => 8,
            OrchestratorError::IoFailure { .. } => 9,
        }
    }

    /// Actionable follow-ups shown under the error message.
    pub fn quick_fixes(&self) -> Vec<String> {
        match self {
            OrchestratorError::NotFound { path } => vec![
                format!("Initialize the workflow so that {} exists", path.display()),
                "Point at another document: --state-file <PATH>".to_string(),
            ],
            OrchestratorError::CorruptState { path, .. } => vec![
                format!("Inspect {} for malformed YAML/JSON or missing fields", path.display()),
                "current_wave must be >= 1 and state_machine must name all three fields".to_string(),
            ],
            OrchestratorError::InvalidDecision { .. } => vec![
                "Use one of: approve, reject".to_string(),
            ],
            OrchestratorError::EmptyReportFile => vec![
                "Pass the reviewed artifact, e.g. wave1-report.json".to_string(),
            ],
            OrchestratorError::WorkflowComplete { .. } => vec![
                "No further waves remain; the workflow is finished".to_string(),
                "Raise workflow.max_wave (or --max-wave) if more waves are planned".to_string(),
            ],
            OrchestratorError::StaleReview { .. } => vec![
                "Start the next review cycle first: wave-orchestrator open-review".to_string(),
            ],
            OrchestratorError::LockTimeout { .. } => vec![
                "Another invocation is updating the state; retry once it finishes".to_string(),
                "Raise state.lock_timeout_ms if updates are slow on this filesystem".to_string(),
            ],
            OrchestratorError::IoFailure { .. } => vec![
                "Check file permissions and free disk space".to_string(),
                "The state document was left in its last saved form; retry the command".to_string(),
            ],
        }
    }
}
