//! # agent-runtime
//!
//! Concrete model clients for the agent system.
//!
//! ## Clients
//!
//! - **Gemini** (default): Generative Language API with native function
//!   calling
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::gemini::GeminiClient;
//!
//! let client = GeminiClient::from_env()?;
//! let agent = AgentBuilder::new()
//!     .client(Arc::new(client))
//!     .build()?;
//! ```

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiClient, GeminiConfig};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentBuilder, AgentError, ModelClient, ModelResponse, Result, Tool, ToolRegistry, Turn,
};
