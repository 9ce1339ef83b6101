//! # Conductor Protocols
//!
//! Core protocol definitions (traits) for the Conductor workflow engine.
//! Contains only interface definitions and shared data types, no implementations.
//!
//! ## Core Traits
//!
//! - [`LLMProvider`] - Trait for LLM provider implementations
//! - [`Tool`] - Trait for tool implementations
//! - [`ToolInvoker`] - Name-based tool invocation used by agents
//! - [`ApprovalStore`] - Durable storage behind the approval gate

pub mod approval;
pub mod error;
pub mod provider;
pub mod tool;
pub mod types;

pub use approval::{
    ApprovalDecision, ApprovalRequest, ApprovalStatus, ApprovalStore, ApprovalUpdate, Resolution,
};
pub use error::{ApprovalError, ProviderError, RegistryError, ToolError};
pub use provider::{CompletionRequest, CompletionResponse, LLMProvider};
pub use tool::{Tool, ToolContext, ToolDefinition, ToolInvoker, ToolResult};
pub use types::*;
