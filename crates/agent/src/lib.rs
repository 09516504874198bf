//! The agent loop — the orchestration core of the HackMD agent.
//!
//! One session follows a bounded cycle:
//!
//! 1. **Receive** a user message
//! 2. **Send** the conversation plus tool declarations to the model
//! 3. **If tool calls**: execute each through the toolbox, append the
//!    result envelopes, loop back to step 2
//! 4. **If text**: the session is done; return the answer
//!
//! The cycle is capped by a turn budget. Hitting the cap is a reported
//! failure, never a silently truncated answer.

pub mod loop_runner;

pub use loop_runner::{AgentLoop, ProcessOutcome};
