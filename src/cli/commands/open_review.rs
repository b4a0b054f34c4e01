use anyhow::Result;

use super::CommandContext;
use crate::telemetry::{create_review_span, generate_correlation_id};

pub struct OpenReviewCommand {
    pub context: CommandContext,
}

impl OpenReviewCommand {
    pub fn new(context: CommandContext) -> Self {
        Self { context }
    }

    pub fn execute(&self) -> Result<()> {
        let correlation_id = generate_correlation_id();
        let span = create_review_span(
            "open-review",
            &self.context.state_file.to_string_lossy(),
            &correlation_id,
        );
        let _entered = span.enter();

        let state = self.context.orchestrator().open_review()?;
        println!("📝 Review opened for wave {} (status PENDING)", state.current_wave);
        Ok(())
    }
}
