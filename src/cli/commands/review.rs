use anyhow::Result;
use chrono::Utc;

use super::CommandContext;
use crate::state::WorkflowState;
use crate::telemetry::{create_review_span, generate_correlation_id};

pub struct ReviewCommand {
    pub report_file: String,
    pub decision: String,
    pub context: CommandContext,
}

impl ReviewCommand {
    pub fn new(report_file: String, decision: String, context: CommandContext) -> Self {
        Self {
            report_file,
            decision,
            context,
        }
    }

    pub fn execute(&self) -> Result<()> {
        let correlation_id = generate_correlation_id();
        let span = create_review_span(
            "review",
            &self.context.state_file.to_string_lossy(),
            &correlation_id,
        );
        let _entered = span.enter();

        let state = self
            .context
            .orchestrator()
            .apply_decision(&self.report_file, &self.decision, Utc::now())?;

        println!("{}", render_confirmation(&state));
        Ok(())
    }
}

/// Confirmation printed after a decision has been committed.
pub fn render_confirmation(state: &WorkflowState) -> String {
    let decision = state
        .wave_review
        .as_ref()
        .map(|review| review.decision.as_str())
        .unwrap_or("recorded");

    let mut lines = vec![format!("✅ State file updated successfully ({decision})")];
    if state.state_machine.next_state.is_empty() {
        lines.push(format!("   🌊 Current wave: {}", state.current_wave));
    } else {
        lines.push(format!(
            "   🌊 Current wave: {} → next: {}",
            state.current_wave, state.state_machine.next_state
        ));
    }
    if !state.state_machine.next_action.is_empty() {
        lines.push(format!("   🎯 {}", state.state_machine.next_action));
    }
    lines.join("\n")
}
