//! Request and response shapes of the generation service.

use forge_core::file::SourceFile;
use serde::Serialize;

/// Body of `POST /edit`.
///
/// `files` carries only the relevance-selected subset; `file_paths` lists
/// every path in the current snapshot so the model knows what exists.
#[derive(Debug, Clone, Serialize)]
pub struct EditRequest {
    pub instructions: String,
    pub error: String,
    pub files: Vec<SourceFile>,
    pub file_paths: Vec<String>,
}

/// Body of `POST /refine` and `POST /parse-text`.
#[derive(Debug, Clone, Serialize)]
pub struct RefineRequest {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SessionRequest<'a> {
    pub session_id: &'a str,
}

/// Pull markdown out of an edit response body.
///
/// The service answers either `{"markdown": "..."}`, a JSON string, or the
/// raw markdown as plain text. Anything else yields an empty string.
pub fn extract_markdown(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(markdown)) => markdown,
        Ok(serde_json::Value::Object(map)) => map
            .get("markdown")
            .and_then(|m| m.as_str())
            .unwrap_or_default()
            .to_string(),
        Ok(_) => String::new(),
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_field() {
        let body = serde_json::json!({ "markdown": "#### a\n```\nx\n```" }).to_string();
        assert_eq!(extract_markdown(&body), "#### a\n```\nx\n```");
    }

    #[test]
    fn json_string_and_raw_text() {
        assert_eq!(extract_markdown(r#""hello""#), "hello");
        assert_eq!(extract_markdown("#### a.ts\n```ts\nx\n```"), "#### a.ts\n```ts\nx\n```");
    }

    #[test]
    fn unusable_bodies_are_empty() {
        assert_eq!(extract_markdown(r#"{"other":1}"#), "");
        assert_eq!(extract_markdown("[1,2]"), "");
        assert_eq!(extract_markdown(r#"{"markdown":null}"#), "");
    }

    #[test]
    fn edit_request_wire_shape() {
        let request = EditRequest {
            instructions: "make it blue".into(),
            error: String::new(),
            files: vec![SourceFile::new("frontend/src/App.tsx", "x")],
            file_paths: vec!["frontend/src/App.tsx".into()],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["instructions"], "make it blue");
        assert_eq!(json["error"], "");
        assert_eq!(json["files"][0]["path"], "frontend/src/App.tsx");
        assert_eq!(json["file_paths"][0], "frontend/src/App.tsx");
    }
}
