//! # HackMD Agent Core
//!
//! Domain types, traits, and error definitions for the HackMD agent.
//! This crate has **zero framework dependencies** — it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two outward-facing seams are defined as traits here: [`NoteService`]
//! (the remote note API) and [`Provider`] (the LLM backend). Implementations
//! live in their respective crates. This enables:
//! - Testing every layer against in-process doubles
//! - Clean dependency graph (all crates depend inward on core)

pub mod agent;
pub mod error;
pub mod message;
pub mod note;
pub mod provider;
pub mod service;

// Re-export key types at crate root for ergonomics
pub use agent::AgentConfig;
pub use error::{AgentError, NoteError, ProviderError};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use note::{NewNote, Note, NotePermission, NoteStatus, NoteUpdate};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use service::NoteService;
