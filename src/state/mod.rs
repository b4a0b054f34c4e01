// Persisted orchestrator state: schema, durable store and cross-process lock

pub mod lock;
pub mod store;
mod timestamp;
pub mod types;

pub use lock::StateLock;
pub use store::{FileStateStore, StateStore};
pub use types::{CurrentReview, ReviewStatus, StateMachineState, WaveReview, WorkflowState, WAVE_START};
