//! # HackMD Client
//!
//! The [`HackMdClient`] is the sole owner of authenticated HTTP traffic
//! to the HackMD v1 REST API. It implements [`NoteService`] and maps
//! every transport-level outcome onto the typed [`NoteError`] taxonomy.
//!
//! Requests carry a bearer token supplied once at construction. There
//! are no retries, no backoff, and no caching: each operation performs
//! exactly one HTTP round trip (plus a follow-up read when the API
//! acknowledges an update with an empty body).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use hackmd_core::error::NoteError;
use hackmd_core::note::{NewNote, Note, NoteStatus, NoteUpdate};
use hackmd_core::service::NoteService;

const DEFAULT_BASE_URL: &str = "https://api.hackmd.io/v1";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Authenticated client for the HackMD v1 API.
pub struct HackMdClient {
    base_url: String,
    api_token: String,
    client: reqwest::Client,
}

impl HackMdClient {
    /// Create a new client with the given API token.
    pub fn new(api_token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_token: api_token.into(),
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing or self-hosted
    /// deployments).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-success status onto the error taxonomy.
    ///
    /// 401/403 mean the token was rejected, 404 means the referenced
    /// note does not exist, everything else is carried verbatim as a
    /// remote failure.
    fn error_for_status(status: u16, note_id: Option<&str>, body: String) -> NoteError {
        match status {
            401 | 403 => NoteError::Auth("invalid or missing API token".into()),
            404 => NoteError::NotFound(note_id.unwrap_or("resource").to_string()),
            _ => NoteError::Remote { status, body },
        }
    }

    /// Send one request and decode a JSON body of type `T`.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        note_id: Option<&str>,
    ) -> Result<T, NoteError> {
        let response = self.send(request, note_id).await?;
        let status = response.status().as_u16();
        response.json::<T>().await.map_err(|e| NoteError::Remote {
            status,
            body: format!("failed to parse response body: {e}"),
        })
    }

    /// Send one request and return the raw successful response.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        note_id: Option<&str>,
    ) -> Result<reqwest::Response, NoteError> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| NoteError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "HackMD API error");
            return Err(Self::error_for_status(status, note_id, body));
        }
        Ok(response)
    }

    /// Case-insensitive title filter used by `search_notes`.
    fn filter_by_title(notes: Vec<Note>, keyword: &str) -> Vec<Note> {
        let needle = keyword.to_lowercase();
        notes
            .into_iter()
            .filter(|n| n.title.to_lowercase().contains(&needle))
            .collect()
    }
}

#[async_trait]
impl NoteService for HackMdClient {
    async fn list_notes(&self) -> Result<Vec<Note>, NoteError> {
        debug!("Listing notes");
        self.send_json(self.client.get(self.url("/notes")), None)
            .await
    }

    async fn read_note(&self, note_id: &str) -> Result<Note, NoteError> {
        if note_id.trim().is_empty() {
            return Err(NoteError::validation("noteId is required"));
        }
        debug!(note_id, "Reading note");
        self.send_json(
            self.client.get(self.url(&format!("/notes/{note_id}"))),
            Some(note_id),
        )
        .await
    }

    async fn create_note(&self, note: NewNote) -> Result<Note, NoteError> {
        if note.title.trim().is_empty() || note.content.trim().is_empty() {
            return Err(NoteError::validation("title and content are required"));
        }
        debug!(title = %note.title, "Creating note");
        self.send_json(self.client.post(self.url("/notes")).json(&note), None)
            .await
    }

    async fn update_note(&self, note_id: &str, update: NoteUpdate) -> Result<Note, NoteError> {
        if note_id.trim().is_empty() || update.content.trim().is_empty() {
            return Err(NoteError::validation("noteId and content are required"));
        }
        debug!(note_id, "Updating note");
        let response = self
            .send(
                self.client
                    .patch(self.url(&format!("/notes/{note_id}")))
                    .json(&update),
                Some(note_id),
            )
            .await?;

        // HackMD acknowledges updates with 202 and an empty body; fetch
        // the entity so callers always get the updated note back.
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| NoteError::Transport(e.to_string()))?;
        if body.trim().is_empty() {
            return self.read_note(note_id).await;
        }
        serde_json::from_str(&body).map_err(|e| NoteError::Remote {
            status,
            body: format!("failed to parse response body: {e}"),
        })
    }

    async fn delete_note(&self, note_id: &str) -> Result<NoteStatus, NoteError> {
        if note_id.trim().is_empty() {
            return Err(NoteError::validation("noteId is required"));
        }
        debug!(note_id, "Deleting note");
        self.send(
            self.client.delete(self.url(&format!("/notes/{note_id}"))),
            Some(note_id),
        )
        .await?;
        Ok(NoteStatus::deleted())
    }

    async fn search_notes(&self, keyword: &str) -> Result<Vec<Note>, NoteError> {
        if keyword.trim().is_empty() {
            return Err(NoteError::validation("keyword is required"));
        }
        // The v1 API has no search endpoint; fetch the listing once and
        // filter titles locally.
        debug!(keyword, "Searching notes by title");
        let notes = self.list_notes().await?;
        Ok(Self::filter_by_title(notes, keyword))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hackmd_core::note::NotePermission;

    fn note(id: &str, title: &str) -> Note {
        Note {
            id: id.into(),
            title: title.into(),
            content: None,
            read_permission: None,
            write_permission: None,
            created_at: None,
            last_changed_at: None,
            publish_link: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn constructor_uses_public_api_base() {
        let client = HackMdClient::new("token");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn base_url_override_trims_trailing_slash() {
        let client = HackMdClient::new("token").with_base_url("https://hackmd.example.com/v1/");
        assert_eq!(client.base_url, "https://hackmd.example.com/v1");
        assert_eq!(client.url("/notes"), "https://hackmd.example.com/v1/notes");
    }

    #[test]
    fn status_mapping_covers_the_taxonomy() {
        assert!(matches!(
            HackMdClient::error_for_status(401, None, String::new()),
            NoteError::Auth(_)
        ));
        assert!(matches!(
            HackMdClient::error_for_status(403, None, String::new()),
            NoteError::Auth(_)
        ));
        match HackMdClient::error_for_status(404, Some("abc"), String::new()) {
            NoteError::NotFound(id) => assert_eq!(id, "abc"),
            other => panic!("expected NotFound, got {other:?}"),
        }
        match HackMdClient::error_for_status(500, None, "boom".into()) {
            NoteError::Remote { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected Remote, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn read_note_rejects_empty_id_before_any_request() {
        let client = HackMdClient::new("token");
        let err = client.read_note("").await.unwrap_err();
        assert!(matches!(err, NoteError::Validation(_)));
        assert_eq!(err.to_string(), "noteId is required");
    }

    #[tokio::test]
    async fn create_note_rejects_blank_title_or_content() {
        let client = HackMdClient::new("token");
        let err = client
            .create_note(NewNote::new("", "body"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "title and content are required");

        let err = client
            .create_note(NewNote::new("Title", "  "))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "title and content are required");
    }

    #[tokio::test]
    async fn update_note_rejects_missing_inputs() {
        let client = HackMdClient::new("token");
        let err = client
            .update_note("", NoteUpdate::new("body"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "noteId and content are required");

        let err = client
            .update_note("abc", NoteUpdate::new(""))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "noteId and content are required");
    }

    #[tokio::test]
    async fn delete_note_rejects_empty_id() {
        let client = HackMdClient::new("token");
        let err = client.delete_note(" ").await.unwrap_err();
        assert_eq!(err.to_string(), "noteId is required");
    }

    #[tokio::test]
    async fn search_rejects_empty_keyword() {
        let client = HackMdClient::new("token");
        let err = client.search_notes("").await.unwrap_err();
        assert_eq!(err.to_string(), "keyword is required");
    }

    #[test]
    fn title_filter_is_case_insensitive() {
        let notes = vec![
            note("1", "Meeting notes"),
            note("2", "Groceries"),
            note("3", "Weekly MEETING agenda"),
        ];
        let hits = HackMdClient::filter_by_title(notes, "meeting");
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|n| n.title.to_lowercase().contains("meeting")));
    }

    #[test]
    fn title_filter_returns_empty_on_no_match() {
        let notes = vec![note("1", "Meeting notes")];
        let hits = HackMdClient::filter_by_title(notes, "payroll");
        assert!(hits.is_empty());
    }

    #[test]
    fn list_response_fixture_parses() {
        let body = r#"[
            {
                "id": "rkzXkryBK",
                "title": "Project kickoff",
                "createdAt": 1634284910076,
                "lastChangedAt": 1634284921313,
                "publishLink": "https://hackmd.io/@user/rJwTJ0BrY",
                "readPermission": "owner",
                "writePermission": "owner",
                "tags": ["work"]
            }
        ]"#;
        let notes: Vec<Note> = serde_json::from_str(body).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, "rkzXkryBK");
        assert_eq!(notes[0].read_permission, Some(NotePermission::Owner));
        assert!(notes[0].content.is_none());
    }

    #[test]
    fn read_response_fixture_parses_with_content() {
        let body = r##"{
            "id": "rkzXkryBK",
            "title": "Project kickoff",
            "content": "# Agenda\n- intros",
            "readPermission": "guest",
            "writePermission": "signed_in"
        }"##;
        let note: Note = serde_json::from_str(body).unwrap();
        assert_eq!(note.content.as_deref(), Some("# Agenda\n- intros"));
        assert_eq!(note.write_permission, Some(NotePermission::SignedIn));
    }
}
