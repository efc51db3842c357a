//! Model Client Abstraction
//!
//! Defines a common interface to the language-model service so the
//! orchestration loop can work with any backend without code changes. The
//! round trip is the loop's only suspension point: one `invoke` per model
//! turn, returning either terminal text or a batch of tool-call requests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tool::{ToolCallRequest, ToolDeclaration};
use crate::turn::Turn;

/// One model response: terminal text, or a request to invoke tools
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelResponse {
    /// Terminal natural-language answer
    Text(String),

    /// One or more tool-call requests, in the model's emission order
    ToolCalls(Vec<ToolCallRequest>),
}

/// Opaque request/response interface to the language-model service
///
/// Implementations own transport, authentication, and timeouts; they report
/// failure as `AgentError::Transport`, flagging rate limiting and service
/// unavailability as retryable.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send the full history plus tool declarations, get one response
    async fn invoke(
        &self,
        history: &[Turn],
        tools: &[ToolDeclaration],
        system_instruction: Option<&str>,
    ) -> Result<ModelResponse>;

    /// Check if the service is reachable and configured correctly
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
