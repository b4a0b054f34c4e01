use anyhow::Result;

use super::CommandContext;
use crate::state::WorkflowState;

pub struct StatusCommand {
    pub json: bool,
    pub context: CommandContext,
}

impl StatusCommand {
    pub fn new(context: CommandContext) -> Self {
        Self {
            json: false,
            context,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn execute(&self) -> Result<()> {
        let state = self.context.orchestrator().status()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&state)?);
        } else {
            println!("{}", render_status(&state, self.context.max_wave));
        }
        Ok(())
    }
}

pub fn render_status(state: &WorkflowState, max_wave: Option<u32>) -> String {
    let mut out = Vec::new();
    out.push("🌊 WAVE ORCHESTRATOR STATUS".to_string());
    out.push("===========================".to_string());
    match max_wave {
        Some(max) => out.push(format!("Current wave: {} of {}", state.current_wave, max)),
        None => out.push(format!("Current wave: {}", state.current_wave)),
    }

    out.push(String::new());
    out.push("⚙️  STATE MACHINE:".to_string());
    out.push(format!("   current_state: {}", display_or_dash(&state.state_machine.current_state)));
    out.push(format!("   next_state:    {}", display_or_dash(&state.state_machine.next_state)));
    out.push(format!("   next_action:   {}", display_or_dash(&state.state_machine.next_action)));

    out.push(String::new());
    match &state.current_review {
        Some(review) => {
            out.push(format!("📝 CURRENT REVIEW: {}", review.status));
            if let Some(completed_at) = review.completed_at {
                out.push(format!("   completed_at: {}", completed_at.to_rfc3339()));
            }
            if let Some(decision) = &review.decision {
                out.push(format!("   decision:     {decision}"));
            }
        }
        None => out.push("📝 CURRENT REVIEW: none in progress".to_string()),
    }

    if let Some(review) = &state.wave_review {
        out.push(String::new());
        out.push("📋 LAST WAVE REVIEW:".to_string());
        out.push(format!("   report_file: {}", review.report_file));
        out.push(format!("   decision:    {}", review.decision));
        out.push(format!("   reviewed_at: {}", review.reviewed_at.to_rfc3339()));
    }

    out.join("\n")
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
