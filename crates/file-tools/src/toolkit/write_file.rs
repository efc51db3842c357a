//! Write File Tool

use async_trait::async_trait;
use serde_json::json;

use agent_core::{
    Result as CoreResult,
    error::AgentError,
    tool::{ParameterSchema, Tool, ToolDeclaration},
};

use super::expand_path;

/// Tool that writes a file, creating or truncating it
pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: "write_file".into(),
            description: "Write a file with the given contents.".into(),
            parameters: vec![
                ParameterSchema::new("file_path", "string", "Path of the file to write.", true),
                ParameterSchema::new(
                    "contents",
                    "string",
                    "Contents to write to the file.",
                    true,
                ),
            ],
        }
    }

    async fn invoke(
        &self,
        arguments: &serde_json::Map<String, serde_json::Value>,
    ) -> CoreResult<serde_json::Value> {
        let file_path = arguments
            .get("file_path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentError::SchemaValidation("Missing file_path".into()))?;
        let contents = arguments
            .get("contents")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentError::SchemaValidation("Missing contents".into()))?;

        let path = expand_path(file_path);

        tokio::fs::write(&path, contents).await.map_err(|e| {
            AgentError::ToolExecution(format!("Failed to write '{}': {}", file_path, e))
        })?;

        tracing::debug!(path = %path.display(), bytes = contents.len(), "Wrote file");

        Ok(json!(true))
    }
}
