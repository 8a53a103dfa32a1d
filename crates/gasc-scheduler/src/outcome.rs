//! How a run ended.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every daemon reported `Finished`.
    Completed,
    /// The external tool exited and the run stopped with it.
    ToolExited { code: Option<i32> },
    /// The host list could not be written or the tool could not start.
    ToolFailed { reason: String },
    /// A node or executor was lost; the run cannot recover.
    Aborted { reason: String },
    /// The driver's event stream ended.
    Disconnected,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RunOutcome::Completed | RunOutcome::ToolExited { code: Some(0) }
        )
    }

    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, RunOutcome::Aborted { .. })
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Completed => write!(f, "all daemons finished"),
            RunOutcome::ToolExited { code: Some(code) } => write!(f, "tool exited with code {code}"),
            RunOutcome::ToolExited { code: None } => write!(f, "tool terminated by signal"),
            RunOutcome::ToolFailed { reason } => write!(f, "tool failed: {reason}"),
            RunOutcome::Aborted { reason } => write!(f, "aborted: {reason}"),
            RunOutcome::Disconnected => write!(f, "driver disconnected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(RunOutcome::Completed.exit_code(), 0);
        assert_eq!(RunOutcome::ToolExited { code: Some(0) }.exit_code(), 0);
        assert_eq!(RunOutcome::ToolExited { code: Some(2) }.exit_code(), 1);
        assert_eq!(RunOutcome::ToolExited { code: None }.exit_code(), 1);
        assert_eq!(RunOutcome::Disconnected.exit_code(), 1);
        assert_eq!(
            RunOutcome::Aborted {
                reason: "lost slave s1".to_string()
            }
            .exit_code(),
            1
        );
    }
}
