//! Agent configuration.

use serde::{Deserialize, Serialize};

/// Configuration for one agent session.
///
/// Always an explicit record passed into the loop constructor. There are
/// no module-level defaults, so sessions with different models or
/// prompts coexist freely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// System prompt seeded into fresh conversations
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Maximum model⇄tool round trips before the session is failed
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Sampling temperature, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens the model may generate per response
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_system_prompt() -> String {
    "You are a helpful agent for managing HackMD notes.".into()
}

fn default_max_turns() -> usize {
    10
}

fn default_max_output_tokens() -> u32 {
    4096
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            system_prompt: default_system_prompt(),
            max_turns: default_max_turns(),
            temperature: None,
            max_output_tokens: default_max_output_tokens(),
        }
    }
}
