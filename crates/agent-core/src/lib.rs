//! # agent-core
//!
//! Orchestration core for model-driven tool calling: the loop that advertises
//! tools to a language model, executes the calls it requests, feeds results
//! back, and returns the terminal answer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Agent                                │
//! │  ┌──────────────┐  ┌──────────────┐  ┌───────────────────┐   │
//! │  │ Conversation │  │ ToolExecutor │  │    ModelClient    │   │
//! │  │   History    │──│ + Registry   │──│     (trait)       │   │
//! │  └──────────────┘  └──────────────┘  └───────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `ModelClient` trait keeps the loop provider-agnostic; tool faults are
//! converted into result data the model can see, so a misbehaving tool never
//! crashes an interactive session.

pub mod agent;
pub mod client;
pub mod error;
pub mod executor;
pub mod tool;
pub mod turn;

pub use agent::{Agent, AgentBuilder, AgentConfig};
pub use client::{ModelClient, ModelResponse};
pub use error::{AgentError, Result};
pub use executor::ToolExecutor;
pub use tool::{
    ParameterSchema, Tool, ToolCallRequest, ToolCallResult, ToolDeclaration, ToolFaultKind,
    ToolOutcome, ToolRegistry,
};
pub use turn::{ConversationHistory, Turn};
