// Review decision workflow: parse, record, advance, commit

pub mod advancer;
pub mod decision;
pub mod orchestrator;
pub mod recorder;

pub use advancer::WaveAdvancer;
pub use decision::Decision;
pub use orchestrator::Orchestrator;
pub use recorder::ReviewRecorder;
