use serde::{Deserialize, Serialize};

/// Token limits of one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelLimits {
    /// Combined input and output tokens per call.
    pub context_window: u32,
    pub max_output_tokens: u32,
}

impl ModelLimits {
    pub const fn new(context_window: u32, max_output_tokens: u32) -> Self {
        Self { context_window, max_output_tokens }
    }
}
