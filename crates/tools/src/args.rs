//! Argument extraction and validation for tool inputs.
//!
//! Inputs arrive as loose JSON records chosen by a language model, so
//! every field is checked here before anything touches the network.
//! A missing, null, empty, or non-string value all count as "not
//! provided" and produce the same message naming the parameter.

use serde_json::Value;

use hackmd_core::error::NoteError;
use hackmd_core::note::{NewNote, NotePermission, NoteUpdate};

/// A present, non-empty string field, or `None`.
fn str_field(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// An optional permission field. Present but invalid values are a
/// validation failure, absent ones are `None`.
fn permission_field(args: &Value, key: &str) -> Result<Option<NotePermission>, NoteError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let raw = value.as_str().unwrap_or_default();
            raw.parse::<NotePermission>().map(Some).map_err(|_| {
                NoteError::validation(format!(
                    "{key} must be one of {}",
                    NotePermission::ALLOWED.join(", ")
                ))
            })
        }
    }
}

pub(crate) fn read_args(args: &Value) -> Result<String, NoteError> {
    str_field(args, "noteId").ok_or_else(|| NoteError::validation("noteId is required"))
}

pub(crate) fn create_args(args: &Value) -> Result<NewNote, NoteError> {
    let title = str_field(args, "title");
    let content = str_field(args, "content");
    let (Some(title), Some(content)) = (title, content) else {
        return Err(NoteError::validation("title and content are required"));
    };

    let mut note = NewNote::new(title, content);
    note.read_permission = permission_field(args, "readPermission")?;
    note.write_permission = permission_field(args, "writePermission")?;
    Ok(note)
}

pub(crate) fn update_args(args: &Value) -> Result<(String, NoteUpdate), NoteError> {
    let note_id = str_field(args, "noteId");
    let content = str_field(args, "content");
    let (Some(note_id), Some(content)) = (note_id, content) else {
        return Err(NoteError::validation("noteId and content are required"));
    };

    let mut update = NoteUpdate::new(content);
    update.read_permission = permission_field(args, "readPermission")?;
    update.write_permission = permission_field(args, "writePermission")?;
    Ok((note_id, update))
}

pub(crate) fn delete_args(args: &Value) -> Result<String, NoteError> {
    str_field(args, "noteId").ok_or_else(|| NoteError::validation("noteId is required"))
}

pub(crate) fn search_args(args: &Value) -> Result<String, NoteError> {
    str_field(args, "keyword").ok_or_else(|| NoteError::validation("keyword is required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_and_empty_note_id_are_equivalent() {
        for args in [json!({}), json!({"noteId": ""}), json!({"noteId": null})] {
            let err = read_args(&args).unwrap_err();
            assert_eq!(err.to_string(), "noteId is required");
        }
        assert_eq!(read_args(&json!({"noteId": "abc"})).unwrap(), "abc");
    }

    #[test]
    fn create_requires_both_title_and_content() {
        let err = create_args(&json!({"title": "T"})).unwrap_err();
        assert_eq!(err.to_string(), "title and content are required");

        let err = create_args(&json!({"content": "C"})).unwrap_err();
        assert_eq!(err.to_string(), "title and content are required");

        let note = create_args(&json!({"title": "T", "content": "C"})).unwrap();
        assert_eq!(note.title, "T");
        assert_eq!(note.content, "C");
        assert!(note.read_permission.is_none());
    }

    #[test]
    fn create_parses_valid_permissions() {
        let note = create_args(&json!({
            "title": "T",
            "content": "C",
            "readPermission": "guest",
            "writePermission": "signed_in"
        }))
        .unwrap();
        assert_eq!(note.read_permission, Some(NotePermission::Guest));
        assert_eq!(note.write_permission, Some(NotePermission::SignedIn));
    }

    #[test]
    fn create_rejects_unknown_permission_value() {
        let err = create_args(&json!({
            "title": "T",
            "content": "C",
            "readPermission": "everyone"
        }))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "readPermission must be one of owner, signed_in, guest"
        );
    }

    #[test]
    fn update_requires_note_id_and_content() {
        let err = update_args(&json!({"noteId": "abc"})).unwrap_err();
        assert_eq!(err.to_string(), "noteId and content are required");

        let (id, update) = update_args(&json!({"noteId": "abc", "content": "new"})).unwrap();
        assert_eq!(id, "abc");
        assert_eq!(update.content, "new");
    }

    #[test]
    fn non_object_input_reads_as_missing_parameters() {
        let err = search_args(&json!("keyword")).unwrap_err();
        assert_eq!(err.to_string(), "keyword is required");
    }
}
