//! The closed set of note operations and their descriptors.

use hackmd_core::provider::ToolDefinition;

/// One of the six note operations.
///
/// Wire names are prefixed `hackmd_` so a model juggling several tool
/// sets can tell them apart. Parameter names are camelCase because that
/// is what the remote API speaks and what the model sees in schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    ListNotes,
    ReadNote,
    CreateNote,
    UpdateNote,
    DeleteNote,
    SearchNotes,
}

impl ToolKind {
    /// Every operation, in the order they are declared to the model.
    pub const ALL: [ToolKind; 6] = [
        ToolKind::ListNotes,
        ToolKind::ReadNote,
        ToolKind::CreateNote,
        ToolKind::UpdateNote,
        ToolKind::DeleteNote,
        ToolKind::SearchNotes,
    ];

    /// The stable wire name of this operation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListNotes => "hackmd_list_notes",
            Self::ReadNote => "hackmd_read_note",
            Self::CreateNote => "hackmd_create_note",
            Self::UpdateNote => "hackmd_update_note",
            Self::DeleteNote => "hackmd_delete_note",
            Self::SearchNotes => "hackmd_search_notes",
        }
    }

    /// Look up an operation by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Description sent to the model.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ListNotes => {
                "List all notes from HackMD. Returns an array of note metadata including id, title, and timestamps."
            }
            Self::ReadNote => {
                "Read a note's full content by its ID. Returns the note metadata and markdown content."
            }
            Self::CreateNote => {
                "Create a new note on HackMD. Returns the created note's metadata including its new ID and URL."
            }
            Self::UpdateNote => {
                "Update an existing note's content. Returns the updated note metadata."
            }
            Self::DeleteNote => {
                "Permanently delete a note by its ID. This action cannot be undone."
            }
            Self::SearchNotes => {
                "Search notes by title keyword. Returns matching notes from your note list."
            }
        }
    }

    /// JSON Schema for this operation's input record.
    pub fn parameters_schema(&self) -> serde_json::Value {
        match self {
            Self::ListNotes => serde_json::json!({
                "type": "object",
                "properties": {}
            }),
            Self::ReadNote => serde_json::json!({
                "type": "object",
                "properties": {
                    "noteId": {
                        "type": "string",
                        "description": "The unique ID of the note to read"
                    }
                },
                "required": ["noteId"]
            }),
            Self::CreateNote => serde_json::json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "The title of the new note"
                    },
                    "content": {
                        "type": "string",
                        "description": "The markdown content of the note"
                    },
                    "readPermission": {
                        "type": "string",
                        "enum": ["owner", "signed_in", "guest"],
                        "description": "Who can read this note (default: owner)"
                    },
                    "writePermission": {
                        "type": "string",
                        "enum": ["owner", "signed_in", "guest"],
                        "description": "Who can write to this note (default: owner)"
                    }
                },
                "required": ["title", "content"]
            }),
            Self::UpdateNote => serde_json::json!({
                "type": "object",
                "properties": {
                    "noteId": {
                        "type": "string",
                        "description": "The unique ID of the note to update"
                    },
                    "content": {
                        "type": "string",
                        "description": "The new markdown content for the note"
                    },
                    "readPermission": {
                        "type": "string",
                        "enum": ["owner", "signed_in", "guest"],
                        "description": "Who can read this note"
                    },
                    "writePermission": {
                        "type": "string",
                        "enum": ["owner", "signed_in", "guest"],
                        "description": "Who can write to this note"
                    }
                },
                "required": ["noteId", "content"]
            }),
            Self::DeleteNote => serde_json::json!({
                "type": "object",
                "properties": {
                    "noteId": {
                        "type": "string",
                        "description": "The unique ID of the note to delete"
                    }
                },
                "required": ["noteId"]
            }),
            Self::SearchNotes => serde_json::json!({
                "type": "object",
                "properties": {
                    "keyword": {
                        "type": "string",
                        "description": "The keyword to search for in note titles"
                    }
                },
                "required": ["keyword"]
            }),
        }
    }

    /// Convert this operation into a ToolDefinition for the LLM.
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}
