//! Orchestration Loop
//!
//! Drives the turn-taking state machine between the model and the local
//! tools: send history plus declarations, interpret the response, execute
//! requested calls, feed results back, repeat until the model produces a
//! terminal answer or the turn cap is hit.

use std::sync::Arc;

use crate::client::{ModelClient, ModelResponse};
use crate::error::{AgentError, Result};
use crate::executor::ToolExecutor;
use crate::tool::{Tool, ToolRegistry};
use crate::turn::{ConversationHistory, Turn};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System instruction resent unchanged on every model invocation
    pub system_instruction: Option<String>,

    /// Maximum model invocations per `run` before giving up
    pub max_turns: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_instruction: None,
            max_turns: 10,
        }
    }
}

/// The main Agent struct
///
/// Owns exactly one registry and one history; multiple independent sessions
/// in one process are just multiple `Agent` values.
pub struct Agent {
    client: Arc<dyn ModelClient>,
    registry: Arc<ToolRegistry>,
    executor: ToolExecutor,
    history: ConversationHistory,
    config: AgentConfig,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("registry", &self.registry.len())
            .field("history", &self.history)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Create a new agent
    pub fn new(client: Arc<dyn ModelClient>, registry: ToolRegistry, config: AgentConfig) -> Self {
        let registry = Arc::new(registry);
        Self {
            client,
            executor: ToolExecutor::new(registry.clone()),
            registry,
            history: ConversationHistory::new(),
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(client: Arc<dyn ModelClient>, registry: ToolRegistry) -> Self {
        Self::new(client, registry, AgentConfig::default())
    }

    /// Run one user input to a terminal answer
    ///
    /// Tool faults are fed back to the model in-band and never surface here;
    /// only transport failures and the turn cap do. History accumulated up
    /// to a failure is retained, so a subsequent `run` resumes context.
    pub async fn run(&mut self, input: &str) -> Result<String> {
        self.history.append(Turn::user(input));

        let mut turns_used = 0;

        loop {
            turns_used += 1;

            if turns_used > self.config.max_turns {
                tracing::warn!(
                    max_turns = self.config.max_turns,
                    history_len = self.history.len(),
                    "Turn cap exceeded without a terminal answer"
                );
                return Err(AgentError::MaxTurnsExceeded(self.config.max_turns));
            }

            let declarations = self.registry.declarations();
            let response = self
                .client
                .invoke(
                    self.history.snapshot(),
                    &declarations,
                    self.config.system_instruction.as_deref(),
                )
                .await?;

            match response {
                ModelResponse::Text(text) => {
                    self.history.append(Turn::model(&text));
                    return Ok(text);
                }
                ModelResponse::ToolCalls(requests) => {
                    if requests.is_empty() {
                        return Err(AgentError::Parse(
                            "model returned an empty tool-call batch".into(),
                        ));
                    }

                    tracing::debug!(count = requests.len(), "Model requested tool calls");

                    for request in &requests {
                        self.history.append(Turn::ToolCallRequest(request.clone()));
                    }

                    // Every request gets exactly one result, appended in
                    // request order, before the next model invocation.
                    let results = self.executor.execute_batch(&requests).await;
                    for result in results {
                        self.history.append(Turn::ToolCallResult(result));
                    }
                }
            }
        }
    }

    /// Get the conversation history
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Get configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    client: Option<Arc<dyn ModelClient>>,
    registry: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            client: None,
            registry: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn client(mut self, client: Arc<dyn ModelClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Register a tool; fails at build time on duplicate names
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Result<Self> {
        self.registry.register(tool)?;
        Ok(self)
    }

    pub fn tools(mut self, registry: ToolRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.system_instruction = Some(instruction.into());
        self
    }

    pub fn max_turns(mut self, max: usize) -> Self {
        self.config.max_turns = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let client = self
            .client
            .ok_or_else(|| AgentError::Config("Model client is required".into()))?;

        Ok(Agent::new(client, self.registry, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{
        ParameterSchema, ToolCallRequest, ToolDeclaration, ToolFaultKind, ToolOutcome,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted model client: pops one canned response per invocation.
    struct ScriptedClient {
        script: Mutex<VecDeque<Result<ModelResponse>>>,
        invocations: AtomicUsize,
        advertised: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(script: Vec<Result<ModelResponse>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                invocations: AtomicUsize::new(0),
                advertised: Mutex::new(Vec::new()),
            })
        }

        fn invocations(&self) -> usize {
            self.invocations.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn invoke(
            &self,
            _history: &[Turn],
            tools: &[ToolDeclaration],
            _system_instruction: Option<&str>,
        ) -> Result<ModelResponse> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            *self.advertised.lock().unwrap() = tools.iter().map(|d| d.name.clone()).collect();
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(ModelResponse::Text("script exhausted".into())))
        }
    }

    struct ListDirTool;

    #[async_trait]
    impl Tool for ListDirTool {
        fn declaration(&self) -> ToolDeclaration {
            ToolDeclaration {
                name: "list_dir".into(),
                description: "List files in a directory".into(),
                parameters: vec![ParameterSchema::new(
                    "path",
                    "string",
                    "Directory to list",
                    true,
                )],
            }
        }

        async fn invoke(
            &self,
            _arguments: &serde_json::Map<String, serde_json::Value>,
        ) -> Result<serde_json::Value> {
            Ok(json!(["a.py", "b.py"]))
        }
    }

    fn tool_call(call_id: &str, tool_name: &str, args: serde_json::Value) -> ToolCallRequest {
        ToolCallRequest {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            arguments: args.as_object().cloned().unwrap_or_default(),
        }
    }

    fn registry_with_list_dir() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(ListDirTool).unwrap();
        registry
    }

    #[tokio::test]
    async fn test_terminal_text_ends_loop() {
        let client = ScriptedClient::new(vec![Ok(ModelResponse::Text("Hello!".into()))]);
        let mut agent = Agent::with_defaults(client.clone(), registry_with_list_dir());

        let answer = agent.run("Hi").await.unwrap();

        assert_eq!(answer, "Hello!");
        assert_eq!(client.invocations(), 1);
        assert!(matches!(agent.history().snapshot()[0], Turn::User { .. }));
        assert!(matches!(agent.history().snapshot()[1], Turn::Model { .. }));
        // Advertised declarations equal the registry contents
        assert_eq!(*client.advertised.lock().unwrap(), vec!["list_dir"]);
    }

    #[tokio::test]
    async fn test_tool_call_round_trip() {
        let client = ScriptedClient::new(vec![
            Ok(ModelResponse::ToolCalls(vec![tool_call(
                "c1",
                "list_dir",
                json!({"path": "X"}),
            )])),
            Ok(ModelResponse::Text("There are 2 files: a.py, b.py".into())),
        ]);
        let mut agent = Agent::with_defaults(client.clone(), registry_with_list_dir());

        let answer = agent.run("list files in dir X").await.unwrap();

        assert_eq!(answer, "There are 2 files: a.py, b.py");
        assert_eq!(client.invocations(), 2);

        let turns = agent.history().snapshot();
        assert_eq!(turns.len(), 4);
        assert!(matches!(turns[0], Turn::User { .. }));
        assert!(matches!(
            &turns[1],
            Turn::ToolCallRequest(r) if r.call_id == "c1" && r.tool_name == "list_dir"
        ));
        assert!(matches!(
            &turns[2],
            Turn::ToolCallResult(r)
                if r.call_id == "c1"
                    && matches!(&r.outcome, ToolOutcome::Ok { value } if value == &json!(["a.py", "b.py"]))
        ));
        assert!(matches!(&turns[3], Turn::Model { text } if text == "There are 2 files: a.py, b.py"));
    }

    #[tokio::test]
    async fn test_every_request_gets_one_result_in_order() {
        let client = ScriptedClient::new(vec![
            Ok(ModelResponse::ToolCalls(vec![
                tool_call("c1", "list_dir", json!({"path": "a"})),
                tool_call("c2", "list_dir", json!({"path": "b"})),
            ])),
            Ok(ModelResponse::Text("done".into())),
        ]);
        let mut agent = Agent::with_defaults(client, registry_with_list_dir());

        agent.run("list twice").await.unwrap();

        let turns = agent.history().snapshot();
        let request_ids: Vec<_> = turns
            .iter()
            .filter_map(|t| match t {
                Turn::ToolCallRequest(r) => Some(r.call_id.clone()),
                _ => None,
            })
            .collect();
        let result_ids: Vec<_> = turns
            .iter()
            .filter_map(|t| match t {
                Turn::ToolCallResult(r) => Some(r.call_id.clone()),
                _ => None,
            })
            .collect();

        assert_eq!(request_ids, vec!["c1", "c2"]);
        assert_eq!(result_ids, request_ids);
        // All results precede the terminal model turn
        assert!(matches!(turns.last().unwrap(), Turn::Model { .. }));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_fed_back_not_fatal() {
        let client = ScriptedClient::new(vec![
            Ok(ModelResponse::ToolCalls(vec![tool_call(
                "c1",
                "delete_everything",
                json!({}),
            )])),
            Ok(ModelResponse::Text("I don't have that tool.".into())),
        ]);
        let mut agent = Agent::with_defaults(client, registry_with_list_dir());

        let answer = agent.run("wipe the disk").await.unwrap();

        assert_eq!(answer, "I don't have that tool.");
        let has_unknown_tool_result = agent.history().snapshot().iter().any(|t| {
            matches!(
                t,
                Turn::ToolCallResult(r)
                    if matches!(r.outcome, ToolOutcome::Err { kind: ToolFaultKind::UnknownTool, .. })
            )
        });
        assert!(has_unknown_tool_result);
    }

    #[tokio::test]
    async fn test_turn_cap_bounds_non_converging_loop() {
        // Model keeps asking for tools and never answers
        let script: Vec<Result<ModelResponse>> = (0..20)
            .map(|i| {
                Ok(ModelResponse::ToolCalls(vec![tool_call(
                    &format!("c{i}"),
                    "list_dir",
                    json!({"path": "."}),
                )]))
            })
            .collect();
        let client = ScriptedClient::new(script);

        let mut agent = AgentBuilder::new()
            .client(client.clone())
            .tools(registry_with_list_dir())
            .max_turns(3)
            .build()
            .unwrap();

        let err = agent.run("loop forever").await.unwrap_err();

        assert!(matches!(err, AgentError::MaxTurnsExceeded(3)));
        assert_eq!(client.invocations(), 3);
        // History is preserved for diagnostic inspection, not rolled back
        assert_eq!(agent.history().len(), 1 + 3 * 2);
    }

    #[tokio::test]
    async fn test_transport_failure_preserves_history_for_retry() {
        let client = ScriptedClient::new(vec![
            Err(AgentError::Transport {
                message: "rate limited".into(),
                retryable: true,
            }),
            Ok(ModelResponse::Text("Recovered.".into())),
        ]);
        let mut agent = Agent::with_defaults(client, registry_with_list_dir());

        let err = agent.run("first try").await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(agent.history().len(), 1);

        // A retried run resumes with the accumulated context
        let answer = agent.run("second try").await.unwrap();
        assert_eq!(answer, "Recovered.");
        assert_eq!(agent.history().len(), 3);
    }

    #[tokio::test]
    async fn test_builder_requires_client() {
        let err = AgentBuilder::new().build().unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }

    #[tokio::test]
    async fn test_system_instruction_fixed_at_construction() {
        let client = ScriptedClient::new(vec![Ok(ModelResponse::Text("ok".into()))]);
        let mut agent = AgentBuilder::new()
            .client(client)
            .system_instruction("You are terse.")
            .build()
            .unwrap();

        agent.run("hi").await.unwrap();
        assert_eq!(agent.config().system_instruction.as_deref(), Some("You are terse."));
    }
}
