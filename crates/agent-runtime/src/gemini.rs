//! Gemini Model Client
//!
//! Implementation of `ModelClient` for the Generative Language API
//! (`generateContent`), including native function calling. Conversation
//! turns map onto the API's content/part structure; function-call parts in
//! the response become tool-call requests with locally minted call ids,
//! since the wire protocol carries none.

use std::time::Duration;

use agent_core::{
    client::{ModelClient, ModelResponse},
    error::{AgentError, Result},
    tool::{ToolCallRequest, ToolDeclaration, ToolOutcome},
    turn::Turn,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Gemini provider configuration
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// API credential
    pub api_key: String,

    /// Model identifier (e.g. "gemini-2.5-flash")
    pub model: String,

    /// API base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gemini-2.5-flash".into(),
            base_url: "https://generativelanguage.googleapis.com".into(),
            timeout_secs: 120,
        }
    }

    /// Read configuration from the environment
    ///
    /// `GEMINI_API_KEY` (or `GOOGLE_API_KEY` as a fallback) is required;
    /// `GEMINI_MODEL` overrides the default model.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .map_err(|_| {
                AgentError::Config("GEMINI_API_KEY or GOOGLE_API_KEY must be set".into())
            })?;

        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.model = model;
        }

        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Wire types (generateContent)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolEnvelope>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(part: Part) -> Self {
        Self {
            role: Some("user".into()),
            parts: vec![part],
        }
    }

    fn model(part: Part) -> Self {
        Self {
            role: Some("model".into()),
            parts: vec![part],
        }
    }

    /// System instructions carry no role
    fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    fn function_call(name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            function_call: Some(FunctionCall {
                name: name.into(),
                args,
            }),
            ..Default::default()
        }
    }

    fn function_response(name: impl Into<String>, response: serde_json::Value) -> Self {
        Self {
            function_response: Some(FunctionResponse {
                name: name.into(),
                response,
            }),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolEnvelope {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Clone, Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Clone, Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Gemini model client
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new client from configuration
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    /// Convert conversation turns to API contents
    fn convert_history(history: &[Turn]) -> Vec<Content> {
        history
            .iter()
            .map(|turn| match turn {
                Turn::User { text } => Content::user(Part::text(text)),
                Turn::Model { text } => Content::model(Part::text(text)),
                Turn::ToolCallRequest(request) => Content::model(Part::function_call(
                    &request.tool_name,
                    serde_json::Value::Object(request.arguments.clone()),
                )),
                // Function results go back with the user role, as the API expects
                Turn::ToolCallResult(result) => {
                    let payload = match &result.outcome {
                        ToolOutcome::Ok { value } => json!({ "result": value }),
                        ToolOutcome::Err { message, .. } => json!({ "error": message }),
                    };
                    Content::user(Part::function_response(&result.tool_name, payload))
                }
            })
            .collect()
    }

    /// Convert tool declarations to the API's function-declaration schema
    fn convert_declarations(tools: &[ToolDeclaration]) -> Option<Vec<ToolEnvelope>> {
        if tools.is_empty() {
            return None;
        }

        let function_declarations = tools
            .iter()
            .map(|decl| {
                let mut properties = serde_json::Map::new();
                let mut required = Vec::new();

                for param in &decl.parameters {
                    properties.insert(
                        param.name.clone(),
                        json!({
                            "type": param.param_type,
                            "description": param.description,
                        }),
                    );
                    if param.required {
                        required.push(param.name.clone());
                    }
                }

                let mut parameters = json!({
                    "type": "object",
                    "properties": properties,
                });
                if !required.is_empty() {
                    parameters["required"] = json!(required);
                }

                FunctionDeclaration {
                    name: decl.name.clone(),
                    description: decl.description.clone(),
                    parameters,
                }
            })
            .collect();

        Some(vec![ToolEnvelope {
            function_declarations,
        }])
    }

    /// Interpret an API response as terminal text or a tool-call batch
    fn interpret_response(response: GenerateContentResponse) -> Result<ModelResponse> {
        let content = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .ok_or_else(|| AgentError::Parse("response carried no candidates".into()))?;

        let calls: Vec<ToolCallRequest> = content
            .parts
            .iter()
            .filter_map(|part| part.function_call.as_ref())
            .map(|call| ToolCallRequest {
                // The API has no call ids; mint one per request
                call_id: Uuid::new_v4().to_string(),
                tool_name: call.name.clone(),
                arguments: call.args.as_object().cloned().unwrap_or_default(),
            })
            .collect();

        if !calls.is_empty() {
            return Ok(ModelResponse::ToolCalls(calls));
        }

        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.is_empty() {
            return Err(AgentError::Parse(
                "response carried neither text nor function calls".into(),
            ));
        }

        Ok(ModelResponse::Text(text))
    }

    fn request_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    fn transport_error(e: &reqwest::Error) -> AgentError {
        AgentError::Transport {
            message: e.to_string(),
            retryable: e.is_timeout() || e.is_connect(),
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn invoke(
        &self,
        history: &[Turn],
        tools: &[ToolDeclaration],
        system_instruction: Option<&str>,
    ) -> Result<ModelResponse> {
        let request = GenerateContentRequest {
            contents: Self::convert_history(history),
            system_instruction: system_instruction.map(Content::system),
            tools: Self::convert_declarations(tools),
        };

        tracing::debug!(model = %self.config.model, turns = history.len(), "Invoking model");

        let response = self
            .http
            .post(self.request_url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // 429 and 5xx are worth retrying; everything else is on us
            let retryable = status.as_u16() == 429 || status.is_server_error();
            tracing::warn!(status = %status, retryable, "Model request failed");
            return Err(AgentError::Transport {
                message: format!("{status}: {body}"),
                retryable,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Parse(e.to_string()))?;

        Self::interpret_response(parsed)
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!(
            "{}/v1beta/models/{}",
            self.config.base_url, self.config.model
        );

        match self
            .http
            .get(url)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::warn!("Gemini health check failed: {}", e);
                Ok(false)
            }
        }
    }
}
