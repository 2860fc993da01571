use chrono::Duration;
use thiserror::Error;

/// Outcome of a refused tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("tool '{tool_id}' has no variant '{variant}'")]
    UnknownVariant { tool_id: String, variant: String },

    #[error("'{variant}' is a Pro variant of '{tool_id}'")]
    VariantLocked { tool_id: String, variant: String },

    #[error("daily limit of {limit} reached for '{tool_id}' (resets in {} min)", .resets_in.num_minutes())]
    QuotaExceeded {
        tool_id: String,
        limit: u32,
        resets_in: Duration,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to persist usage: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl ToolError {
    /// Refusals an upgrade to Pro would lift.
    pub fn wants_upgrade(&self) -> bool {
        matches!(
            self,
            ToolError::QuotaExceeded { .. } | ToolError::VariantLocked { .. }
        )
    }
}
