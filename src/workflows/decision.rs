use std::str::FromStr;

use crate::errors::OrchestratorError;
use crate::state::ReviewStatus;

/// Outcome of a wave review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// Canonical token written to the state document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        }
    }

    /// Review status this decision leaves on `current_review`.
    pub fn review_status(&self) -> ReviewStatus {
        match self {
            Decision::Approve => ReviewStatus::Approved,
            Decision::Reject => ReviewStatus::Rejected,
        }
    }

    pub fn is_approval(&self) -> bool {
        matches!(self, Decision::Approve)
    }
}

impl FromStr for Decision {
    type Err = OrchestratorError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim().to_ascii_lowercase().as_str() {
            "approve" | "approved" => Ok(Decision::Approve),
            "reject" | "rejected" => Ok(Decision::Reject),
            _ => Err(OrchestratorError::InvalidDecision {
                token: token.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recognized_tokens() {
        assert_eq!("approve".parse::<Decision>().unwrap(), Decision::Approve);
        assert_eq!(" APPROVED ".parse::<Decision>().unwrap(), Decision::Approve);
        assert_eq!("reject".parse::<Decision>().unwrap(), Decision::Reject);
        assert_eq!("Rejected".parse::<Decision>().unwrap(), Decision::Reject);
    }

    #[test]
    fn test_parse_unknown_token_keeps_original_text() {
        for token in ["maybe", "", "approve!", "yes"] {
            match token.parse::<Decision>() {
                Err(OrchestratorError::InvalidDecision { token: reported }) => assert_eq!(reported, token),
                other => panic!("expected InvalidDecision for {token:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_decision_mirrors_review_status() {
        assert_eq!(Decision::Approve.review_status(), ReviewStatus::Approved);
        assert_eq!(Decision::Reject.review_status(), ReviewStatus::Rejected);
        assert_eq!(Decision::Reject.to_string(), "reject");
    }
}
