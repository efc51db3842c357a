//! Read File Tool

use async_trait::async_trait;
use serde_json::json;

use agent_core::{
    Result as CoreResult,
    error::AgentError,
    tool::{ParameterSchema, Tool, ToolDeclaration},
};

use super::expand_path;

/// Maximum file size to read (10 MB) - larger files would flood the model
const MAX_READ_SIZE: u64 = 10 * 1024 * 1024;

/// Tool that reads a file and returns its contents
pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: "read_file".into(),
            description: "Read a file and return its contents.".into(),
            parameters: vec![ParameterSchema::new(
                "file_path",
                "string",
                "Path of the file to read.",
                true,
            )],
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

        let path = expand_path(file_path);

        let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
            AgentError::ToolExecution(format!("Cannot access '{}': {}", file_path, e))
        })?;

        if !metadata.is_file() {
            return Err(AgentError::ToolExecution(format!(
                "'{}' is not a file",
                file_path
            )));
        }

        if metadata.len() > MAX_READ_SIZE {
            return Err(AgentError::ToolExecution(format!(
                "File too large ({} bytes, maximum {})",
                metadata.len(),
                MAX_READ_SIZE
            )));
        }

        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            AgentError::ToolExecution(format!("Failed to read '{}': {}", file_path, e))
        })?;

        Ok(json!(contents))
    }
}
