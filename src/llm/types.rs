use crate::schema::{Message, StepId};
use serde::{Deserialize, Serialize};

/// Body of a step-endpoint request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRequest {
    pub messages: Vec<Message>,
    pub prompt_type: StepId,
}

/// Body of a chat-endpoint request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}

/// JSON error body returned by the endpoints before streaming starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointError {
    pub error: String,
}

/// Progress reported while a step runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepEvent {
    Started { step: StepId },
    Received { step: StepId, fragments: usize, chars: usize },
    Merged { step: StepId, replaced: bool },
    Completed { step: StepId },
    Failed { step: StepId, reason: String },
}
