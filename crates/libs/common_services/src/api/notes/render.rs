//! Plain-text rendering of notes for downloads and admin exports.

use crate::database::note::NoteWithFile;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt::Write;

const SEPARATOR_WIDTH: usize = 50;

/// Parses stored note content, falling back to the raw text when it is not JSON.
#[must_use]
pub fn parse_note_content(content: &str) -> Value {
    serde_json::from_str(content).unwrap_or_else(|_| Value::String(content.to_owned()))
}

/// Renders note content as text. Objects and arrays become `KEY:\nvalue\n\n` blocks.
#[must_use]
pub fn render_note_body(content: &Value) -> String {
    match content {
        Value::Object(map) => {
            let mut out = String::new();
            for (key, value) in map {
                push_block(&mut out, &key.to_uppercase(), value);
            }
            out
        }
        Value::Array(items) => {
            let mut out = String::new();
            for (index, value) in items.iter().enumerate() {
                push_block(&mut out, &index.to_string(), value);
            }
            out
        }
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn push_block(out: &mut String, key: &str, value: &Value) {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let _ = write!(out, "{key}:\n{text}\n\n");
}

fn separator() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Full text of a single note download.
#[must_use]
pub fn render_note_document(note: &NoteWithFile) -> String {
    format!(
        "Notes Generated: {}\nFile: {}\nType: {}\n\n{}\n\n{}",
        format_timestamp(note.created_at),
        note.original_name,
        note.note_type,
        separator(),
        render_note_body(&parse_note_content(&note.content)),
    )
}

/// Concatenated export of many notes.
#[must_use]
pub fn render_notes_export(notes: &[NoteWithFile]) -> String {
    let mut out = String::new();
    for note in notes {
        let _ = write!(
            out,
            "=== {} ===\nUser: {}\nGenerated: {}\n\n{}\n\n{}\n\n",
            note_download_filename(note.created_at, &note.note_type, &note.original_name),
            note.user_email.as_deref().unwrap_or("Anonymous"),
            format_timestamp(note.created_at),
            separator(),
            render_note_body(&parse_note_content(&note.content)),
        );
    }
    out
}

/// `{YYYY-MM-DD}_{noteType}_{originalNameWithoutExt}.txt`
#[must_use]
pub fn note_download_filename(
    created_at: DateTime<Utc>,
    note_type: &str,
    original_name: &str,
) -> String {
    format!(
        "{}_{}_{}.txt",
        created_at.format("%Y-%m-%d"),
        sanitize_filename_part(note_type),
        sanitize_filename_part(strip_extension(original_name)),
    )
}

/// Drops the last `.ext` segment, if it contains no path separator.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(index) if index + 1 < name.len() && !name[index..].contains('/') => &name[..index],
        _ => name,
    }
}

/// Keeps header-safe characters for `Content-Disposition`.
fn sanitize_filename_part(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_control() || matches!(c, '"' | '\\' | '/') {
                '_'
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use common_types::note::NoteStatus;
    use serde_json::json;

    fn note(content: &str, user_email: Option<&str>) -> NoteWithFile {
        NoteWithFile {
            id: 1,
            note_type: "soap".into(),
            content: content.into(),
            status: NoteStatus::Generated,
            retention_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap_or_default(),
            created_at: Utc
                .with_ymd_and_hms(2025, 1, 1, 9, 30, 0)
                .single()
                .unwrap_or_default(),
            file_id: 2,
            filename: "1735723800000_abcdefghijklm.mp3".into(),
            original_name: "visit.mp3".into(),
            file_size: 10,
            file_type: "audio/mpeg".into(),
            user_id: None,
            user_email: user_email.map(ToOwned::to_owned),
        }
    }

    #[test]
    fn content_falls_back_to_raw_text() {
        assert_eq!(parse_note_content(r#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_note_content("plain words"), json!("plain words"));
    }

    #[test]
    fn object_content_renders_as_blocks() {
        let body = render_note_body(&json!({
            "subjective": "Headache for two days",
            "plan": ["rest", "fluids"],
        }));
        assert!(body.contains("SUBJECTIVE:\nHeadache for two days\n\n"));
        assert!(body.contains("PLAN:\n[\"rest\",\"fluids\"]\n\n"));
    }

    #[test]
    fn array_content_uses_index_keys() {
        assert_eq!(render_note_body(&json!(["a", 2])), "0:\na\n\n1:\n2\n\n");
    }

    #[test]
    fn scalar_content_renders_as_is() {
        assert_eq!(render_note_body(&json!("just text")), "just text");
        assert_eq!(render_note_body(&json!(42)), "42");
        assert_eq!(render_note_body(&Value::Null), "");
    }

    #[test]
    fn document_has_header_and_separator() {
        let text = render_note_document(&note(r#"{"summary":"ok"}"#, None));
        let expected = format!(
            "Notes Generated: 2025-01-01 09:30:00 UTC\nFile: visit.mp3\nType: soap\n\n{}\n\nSUMMARY:\nok\n\n",
            "=".repeat(50)
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn export_names_user_or_anonymous() {
        let text = render_notes_export(&[
            note(r#""first""#, Some("a@example.com")),
            note(r#""second""#, None),
        ]);
        assert!(text.starts_with("=== 2025-01-01_soap_visit.txt ===\nUser: a@example.com\n"));
        assert!(text.contains("User: Anonymous\nGenerated: 2025-01-01 09:30:00 UTC"));
        assert!(text.ends_with("second\n\n"));
    }

    #[test]
    fn download_filename_strips_only_the_last_extension() {
        let at = Utc
            .with_ymd_and_hms(2024, 12, 31, 23, 0, 0)
            .single()
            .unwrap_or_default();
        assert_eq!(
            note_download_filename(at, "general", "call.backup.m4a"),
            "2024-12-31_general_call.backup.txt"
        );
        assert_eq!(
            note_download_filename(at, "general", "README"),
            "2024-12-31_general_README.txt"
        );
        assert_eq!(
            note_download_filename(at, "x\"y", "a\"b.txt"),
            "2024-12-31_x_y_a_b.txt"
        );
    }
}
