//! List Directory Tool

use async_trait::async_trait;
use serde_json::json;

use agent_core::{
    Result as CoreResult,
    error::AgentError,
    tool::{ParameterSchema, Tool, ToolDeclaration},
};

use super::expand_path;

/// Tool that lists the entries of a directory
pub struct ListDirTool;

#[async_trait]
impl Tool for ListDirTool {
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: "list_dir".into(),
            description:
                "List all files and folders in the given directory. Use '.' for the current directory."
                    .into(),
            parameters: vec![ParameterSchema::new(
                "directory_path",
                "string",
                "Path of the directory to list, e.g. '.' for the current directory or '..' for the parent.",
                true,
            )],
        }
    }

    async fn invoke(
        &self,
        arguments: &serde_json::Map<String, serde_json::Value>,
    ) -> CoreResult<serde_json::Value> {
        let directory_path = arguments
            .get("directory_path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentError::SchemaValidation("Missing directory_path".into()))?;

        let path = expand_path(directory_path);

        let mut reader = tokio::fs::read_dir(&path).await.map_err(|e| {
            AgentError::ToolExecution(format!("Cannot list '{}': {}", directory_path, e))
        })?;

        let mut names = Vec::new();
        while let Some(entry) = reader.next_entry().await.map_err(|e| {
            AgentError::ToolExecution(format!("Cannot list '{}': {}", directory_path, e))
        })? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        // Sorted so identical directories always list identically
        names.sort();

        Ok(json!(names))
    }
}
