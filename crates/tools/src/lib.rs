//! HackMD note tools.
//!
//! The agent acts on notes through exactly six operations: list, read,
//! create, update, delete, and search. They are modeled as a closed
//! [`ToolKind`] enum rather than an open registry — the tool set is not
//! meant to be extended at runtime, and a fixed enum lets the compiler
//! check that every operation handles validation and result shaping.
//!
//! [`NoteToolbox`] binds the six kinds to one `NoteService` and owns the
//! invocation gateway: every call, whatever happens inside it, comes
//! back as a JSON string that is either the operation's success payload
//! or `{"error": "<message>"}`.

mod args;
mod kind;
mod toolbox;

pub use kind::ToolKind;
pub use toolbox::NoteToolbox;
