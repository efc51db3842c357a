//! # file-tools
//!
//! File-system capabilities for the agent: reading, writing, and listing,
//! declared with schemas the model can call against.
//!
//! These are ordinary I/O wrappers. They do no sandboxing and no path
//! policy; anything the process can touch, a registered tool can touch.
//! Host applications that need confinement must wrap or replace them.

pub mod toolkit;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::toolkit::{ListDirTool, ReadFileTool, WriteFileTool};
}

/// System instruction for a file-capable coding assistant
pub const FILE_ASSISTANT_PROMPT: &str = r#"You are a helpful coding assistant with access to the local file system.

## Working With Files

1. Use `list_dir` to discover what exists before guessing at paths
2. Use `read_file` to inspect contents before proposing changes
3. Use `write_file` only when the user asked for a file to be created or changed
4. Quote paths back to the user exactly as the tools report them

If a tool reports an error, tell the user what failed rather than retrying blindly.

## Tools Available

- `read_file` - Read a file and return its contents
- `write_file` - Write a file with the given contents
- `list_dir` - List all files and folders in a directory

Answer directly, without tools, when the question needs none."#;
