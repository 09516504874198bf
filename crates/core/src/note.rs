//! Note domain types mirroring the HackMD v1 wire shapes.
//!
//! Notes are owned entirely by the remote service. Nothing here is
//! persisted locally; these structs live for one request/response cycle
//! and serialize back out (camelCase) exactly as the API speaks them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Who may read or write a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotePermission {
    /// Only the owning account
    Owner,
    /// Any signed-in HackMD user
    SignedIn,
    /// Anyone with the link
    Guest,
}

impl NotePermission {
    /// The accepted wire spellings, in the order user messages cite them.
    pub const ALLOWED: [&'static str; 3] = ["owner", "signed_in", "guest"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::SignedIn => "signed_in",
            Self::Guest => "guest",
        }
    }
}

impl FromStr for NotePermission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "signed_in" => Ok(Self::SignedIn),
            "guest" => Ok(Self::Guest),
            other => Err(format!(
                "invalid permission '{other}', must be one of {}",
                Self::ALLOWED.join(", ")
            )),
        }
    }
}

impl std::fmt::Display for NotePermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A note as the remote service describes it.
///
/// List responses omit `content`; read responses include it. Timestamps
/// are epoch milliseconds, exactly as HackMD sends them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Opaque remote identifier
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_permission: Option<NotePermission>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_permission: Option<NotePermission>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_changed_at: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_link: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Payload for creating a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub title: String,
    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_permission: Option<NotePermission>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_permission: Option<NotePermission>,
}

impl NewNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            read_permission: None,
            write_permission: None,
        }
    }
}

/// Payload for updating an existing note.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteUpdate {
    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_permission: Option<NotePermission>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_permission: Option<NotePermission>,
}

impl NoteUpdate {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            read_permission: None,
            write_permission: None,
        }
    }
}

/// Status record returned by operations without an entity payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteStatus {
    pub success: bool,
    pub message: String,
}

impl NoteStatus {
    pub fn deleted() -> Self {
        Self {
            success: true,
            message: "Note deleted".into(),
        }
    }
}
