//! Error types for the HackMD agent domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; nothing here is an
//! untyped catch-all.

use thiserror::Error;

/// Failures raised by the remote note service layer.
///
/// The `Display` text of each variant is what callers put into the
/// uniform `{"error": ...}` envelope, so messages are written for an
/// end user (or a language model), not for a debugger.
#[derive(Debug, Clone, Error)]
pub enum NoteError {
    /// Malformed or missing input, detected before any network call.
    #[error("{0}")]
    Validation(String),

    /// The API token was missing, invalid, or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The referenced note does not exist.
    #[error("note not found: {0}")]
    NotFound(String),

    /// The remote service answered with a non-2xx status.
    #[error("remote API error (status {status}): {body}")]
    Remote { status: u16, body: String },

    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(String),
}

impl NoteError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Failures raised by an LLM provider backend.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    /// Classification only. No caller retries on this; surfacing the
    /// status lets the host print an actionable message.
    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("provider returned an unusable response: {0}")]
    InvalidResponse(String),

    #[error("network error: {0}")]
    Network(String),
}

/// Failures surfaced by the agent loop to its caller.
///
/// Tool failures never appear here: they are folded into the tool's
/// error envelope and handed back to the model as ordinary output.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model kept requesting tools until the turn ceiling was hit.
    #[error("turn budget exceeded: no final answer after {limit} turns")]
    TurnBudgetExceeded { limit: usize },

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}
