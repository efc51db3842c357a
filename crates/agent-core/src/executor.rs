//! Tool Execution
//!
//! Resolves tool-call requests against the registry and produces structured
//! results. Every fault on the way - unknown tool, schema violation, handler
//! failure - is converted into result data; nothing escapes to the
//! orchestration loop as a propagating failure.

use std::sync::Arc;

use futures::future::join_all;

use crate::tool::{ToolCallRequest, ToolCallResult, ToolFaultKind, ToolRegistry};

/// Executes tool-call requests against a registry
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Execute a single request
    ///
    /// Infallible at the type level: every call path terminates in a
    /// `ToolCallResult`, successful or error-carrying.
    pub async fn execute(&self, request: &ToolCallRequest) -> ToolCallResult {
        let tool = match self.registry.lookup(&request.tool_name) {
            Ok(tool) => tool,
            Err(e) => {
                tracing::warn!(tool = %request.tool_name, "Model requested unknown tool");
                return ToolCallResult::failure(
                    &request.call_id,
                    &request.tool_name,
                    ToolFaultKind::UnknownTool,
                    e.to_string(),
                );
            }
        };

        if let Err(e) = tool.validate(&request.arguments) {
            return ToolCallResult::failure(
                &request.call_id,
                &request.tool_name,
                ToolFaultKind::InvalidArguments,
                e.to_string(),
            );
        }

        tracing::debug!(tool = %request.tool_name, call_id = %request.call_id, "Executing tool");

        match tool.invoke(&request.arguments).await {
            Ok(value) => ToolCallResult::success(&request.call_id, &request.tool_name, value),
            Err(e) => {
                tracing::warn!(tool = %request.tool_name, error = %e, "Tool handler failed");
                ToolCallResult::failure(
                    &request.call_id,
                    &request.tool_name,
                    ToolFaultKind::ExecutionFailed,
                    e.to_string(),
                )
            }
        }
    }

    /// Execute a whole model turn's batch of requests
    ///
    /// Calls run concurrently (they are independent within one batch), but
    /// results come back in request order regardless of completion order, so
    /// history stays deterministic.
    pub async fn execute_batch(&self, requests: &[ToolCallRequest]) -> Vec<ToolCallResult> {
        join_all(requests.iter().map(|request| self.execute(request))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AgentError, Result};
    use crate::tool::{ParameterSchema, Tool, ToolDeclaration, ToolOutcome};
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Duration;

    /// Uppercases its input, sleeping first when asked - used to prove that
    /// batch results come back in request order even when the first request
    /// finishes last.
    struct UppercaseTool;

    #[async_trait]
    impl Tool for UppercaseTool {
        fn declaration(&self) -> ToolDeclaration {
            ToolDeclaration {
                name: "uppercase".into(),
                description: "Uppercase the given text".into(),
                parameters: vec![
                    ParameterSchema::new("text", "string", "Text to uppercase", true),
                    ParameterSchema::new("delay_ms", "integer", "Sleep before answering", false),
                ],
            }
        }

        async fn invoke(
            &self,
            arguments: &serde_json::Map<String, serde_json::Value>,
        ) -> Result<serde_json::Value> {
            if let Some(ms) = arguments.get("delay_ms").and_then(|v| v.as_u64()) {
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
            let text = arguments.get("text").and_then(|v| v.as_str()).unwrap_or("");
            Ok(json!(text.to_uppercase()))
        }
    }

    struct FaultyTool;

    #[async_trait]
    impl Tool for FaultyTool {
        fn declaration(&self) -> ToolDeclaration {
            ToolDeclaration {
                name: "faulty".into(),
                description: "Always fails".into(),
                parameters: vec![],
            }
        }

        async fn invoke(
            &self,
            _arguments: &serde_json::Map<String, serde_json::Value>,
        ) -> Result<serde_json::Value> {
            Err(AgentError::ToolExecution("boom".into()))
        }
    }

    fn executor() -> ToolExecutor {
        let mut registry = ToolRegistry::new();
        registry.register(UppercaseTool).unwrap();
        registry.register(FaultyTool).unwrap();
        ToolExecutor::new(Arc::new(registry))
    }

    fn request(call_id: &str, tool_name: &str, args: serde_json::Value) -> ToolCallRequest {
        ToolCallRequest {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            arguments: args.as_object().cloned().unwrap_or_default(),
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_result_data() {
        let result = executor()
            .execute(&request("c1", "no_such_tool", json!({})))
            .await;

        assert_eq!(result.call_id, "c1");
        assert!(matches!(
            result.outcome,
            ToolOutcome::Err { kind: ToolFaultKind::UnknownTool, .. }
        ));
    }

    #[tokio::test]
    async fn test_schema_violation_becomes_result_data() {
        let result = executor()
            .execute(&request("c1", "uppercase", json!({})))
            .await;

        assert!(matches!(
            result.outcome,
            ToolOutcome::Err { kind: ToolFaultKind::InvalidArguments, .. }
        ));
    }

    #[tokio::test]
    async fn test_handler_fault_becomes_result_data() {
        let result = executor().execute(&request("c1", "faulty", json!({}))).await;

        assert!(matches!(
            result.outcome,
            ToolOutcome::Err { kind: ToolFaultKind::ExecutionFailed, .. }
        ));
    }

    #[tokio::test]
    async fn test_successful_execution() {
        let result = executor()
            .execute(&request("c1", "uppercase", json!({"text": "hi"})))
            .await;

        assert!(result.is_success());
        assert!(matches!(
            result.outcome,
            ToolOutcome::Ok { ref value } if value == &json!("HI")
        ));
    }

    #[tokio::test]
    async fn test_pure_tool_is_idempotent() {
        let executor = executor();
        let req = request("c1", "uppercase", json!({"text": "same"}));

        let first = executor.execute(&req).await;
        let second = executor.execute(&req).await;

        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_batch_results_in_request_order() {
        let executor = executor();
        let requests = vec![
            request("c1", "uppercase", json!({"text": "slow", "delay_ms": 50})),
            request("c2", "uppercase", json!({"text": "fast"})),
            request("c3", "faulty", json!({})),
        ];

        let results = executor.execute_batch(&requests).await;

        assert_eq!(results.len(), 3);
        let ids: Vec<_> = results.iter().map(|r| r.call_id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
        assert!(results[0].is_success());
        assert!(results[1].is_success());
        assert!(!results[2].is_success());
    }
}
