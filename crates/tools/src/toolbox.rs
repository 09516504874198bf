//! The toolbox: six operations bound to one note service, plus the
//! invocation gateway.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use hackmd_core::provider::ToolDefinition;
use hackmd_core::service::NoteService;

use crate::args;
use crate::kind::ToolKind;

/// The six note tools bound to an authenticated service.
///
/// Each `NoteToolbox` is an independent binding: two toolboxes built
/// from two services share nothing. Cloning shares the underlying
/// service handle, which holds no mutable state.
#[derive(Clone)]
pub struct NoteToolbox {
    service: Arc<dyn NoteService>,
}

impl NoteToolbox {
    pub fn new(service: Arc<dyn NoteService>) -> Self {
        Self { service }
    }

    /// Definitions for all six tools, for handing to a schema adapter.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        ToolKind::ALL.iter().map(ToolKind::definition).collect()
    }

    /// The six wire names, in declaration order.
    pub fn names(&self) -> Vec<&'static str> {
        ToolKind::ALL.iter().map(ToolKind::name).collect()
    }

    /// Invoke a tool by wire name.
    ///
    /// This is the gateway contract: every outcome, including an unknown
    /// name, is a JSON string. Nothing propagates past this boundary.
    pub async fn execute(&self, name: &str, input: Value) -> String {
        match ToolKind::from_name(name) {
            Some(kind) => self.run(kind, input).await,
            None => {
                debug!(tool = name, "Unknown tool requested");
                error_envelope(format_args!("Unknown tool: {name}"))
            }
        }
    }

    /// Invoke one operation and fold its outcome into the envelope.
    pub async fn run(&self, kind: ToolKind, input: Value) -> String {
        debug!(tool = kind.name(), "Executing tool");
        match kind {
            ToolKind::ListNotes => envelope(self.service.list_notes().await),
            ToolKind::ReadNote => match args::read_args(&input) {
                Ok(note_id) => envelope(self.service.read_note(&note_id).await),
                Err(e) => error_envelope(e),
            },
            ToolKind::CreateNote => match args::create_args(&input) {
                Ok(note) => envelope(self.service.create_note(note).await),
                Err(e) => error_envelope(e),
            },
            ToolKind::UpdateNote => match args::update_args(&input) {
                Ok((note_id, update)) => {
                    envelope(self.service.update_note(&note_id, update).await)
                }
                Err(e) => error_envelope(e),
            },
            ToolKind::DeleteNote => match args::delete_args(&input) {
                Ok(note_id) => envelope_compact(self.service.delete_note(&note_id).await),
                Err(e) => error_envelope(e),
            },
            ToolKind::SearchNotes => match args::search_args(&input) {
                Ok(keyword) => envelope(self.service.search_notes(&keyword).await),
                Err(e) => error_envelope(e),
            },
        }
    }
}

/// Success payloads are pretty-printed so the model (and a human reading
/// a transcript) can follow them.
fn envelope<T: Serialize, E: std::fmt::Display>(result: Result<T, E>) -> String {
    match result {
        Ok(payload) => match serde_json::to_string_pretty(&payload) {
            Ok(json) => json,
            Err(e) => error_envelope(e),
        },
        Err(e) => error_envelope(e),
    }
}

/// Status records stay compact.
fn envelope_compact<T: Serialize, E: std::fmt::Display>(result: Result<T, E>) -> String {
    match result {
        Ok(payload) => match serde_json::to_string(&payload) {
            Ok(json) => json,
            Err(e) => error_envelope(e),
        },
        Err(e) => error_envelope(e),
    }
}

fn error_envelope(message: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": message.to_string() }).to_string()
}
