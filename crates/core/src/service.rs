//! NoteService trait — the abstraction over the remote note API.
//!
//! Exactly one implementation talks HTTP (`hackmd-client`); everything
//! downstream of the tool layer is written against this trait so it can
//! run against an in-process double in tests.

use async_trait::async_trait;

use crate::error::NoteError;
use crate::note::{NewNote, Note, NoteStatus, NoteUpdate};

/// The six remote note operations.
///
/// Every method performs at most one outbound request. There are no
/// retries and no caching; latency and failure belong to the remote end.
#[async_trait]
pub trait NoteService: Send + Sync {
    /// List the authenticated user's notes. Entries carry metadata only,
    /// no content body.
    async fn list_notes(&self) -> Result<Vec<Note>, NoteError>;

    /// Fetch one note, content included.
    async fn read_note(&self, note_id: &str) -> Result<Note, NoteError>;

    /// Create a note and return it with its assigned id and publish link.
    async fn create_note(&self, note: NewNote) -> Result<Note, NoteError>;

    /// Replace a note's content (and optionally its permissions).
    async fn update_note(&self, note_id: &str, update: NoteUpdate) -> Result<Note, NoteError>;

    /// Delete a note. Deleting an already-deleted id is a `NotFound`
    /// failure, not a no-op.
    async fn delete_note(&self, note_id: &str) -> Result<NoteStatus, NoteError>;

    /// Notes whose title contains `keyword`, case-insensitively.
    /// An empty match set is an empty `Vec`, not an error.
    async fn search_notes(&self, keyword: &str) -> Result<Vec<Note>, NoteError>;
}
