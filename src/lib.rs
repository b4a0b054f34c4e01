// Wave Orchestrator Library - review decisions over a persisted multi-wave workflow
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod errors;
pub mod state;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use config::WaveOrchestratorConfig;
pub use errors::OrchestratorError;
pub use state::{
    CurrentReview, FileStateStore, ReviewStatus, StateLock, StateMachineState, StateStore, WaveReview, WorkflowState,
    WAVE_START,
};
pub use telemetry::{create_review_span, generate_correlation_id, init_telemetry};
pub use workflows::{Decision, Orchestrator, ReviewRecorder, WaveAdvancer};
