//! LLM provider implementations for the HackMD agent.
//!
//! All providers implement the `hackmd_core::Provider` trait. The loop
//! never knows which backend it is talking to.

pub mod gemini;

pub use gemini::GeminiProvider;
