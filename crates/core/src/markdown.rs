//! Markdown artifact parsing.
//!
//! The generation service answers with markdown in which every file is a
//! heading line naming the path, immediately followed by a fenced code block:
//!
//! ````text
//! #### frontend/src/App.tsx
//! ```tsx
//! export default function App() {}
//! ```
//! ````
//!
//! [`parse`] turns that text into a canonical, de-duplicated artifact list.
//! The first block for a canonical path wins; later duplicates are dropped.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::file::SourceFile;
use crate::hashing::sha256_hex;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Path of the synthetic artifact emitted when no file blocks are found.
pub const FALLBACK_PATH: &str = "response.md";

/// Namespace prefix for UI-side root files.
pub const FRONTEND_PREFIX: &str = "frontend";

/// Namespace prefix for server-side root files.
pub const BACKEND_PREFIX: &str = "backend";

/// A heading line (1-6 `#`) whose text is the path, then a fenced block.
static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^#{1,6}[ \t]*(.*?)[ \t]*\r?\n```[\w+.-]*[ \t]*\r?\n((?s:.*?))```")
        .expect("valid regex")
});

/// Bare root filenames that belong to the UI build.
static FRONTEND_ROOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(vite\.config\.(ts|js)|tsconfig(\.json|\.app\.json|\.node\.json)|tailwind\.config\.(js|cjs|ts)|postcss\.config\.(js|cjs)|package\.json|index\.html)$",
    )
    .expect("valid regex")
});

/// Bare root filenames that belong to the server build.
static BACKEND_ROOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(requirements\.txt|pyproject\.toml|main\.py|server\.(ts|js))$")
        .expect("valid regex")
});

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One file recovered from generated markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedArtifact {
    pub path: String,
    pub content: String,
    /// SHA-256 hex digest of `content`.
    pub hash: String,
}

impl ParsedArtifact {
    fn new(path: String, content: String) -> Self {
        let hash = sha256_hex(content.as_bytes());
        Self {
            path,
            content,
            hash,
        }
    }

    pub fn to_source_file(&self) -> SourceFile {
        SourceFile::new(self.path.clone(), self.content.clone())
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse generated markdown into artifacts, degrading to a single
/// [`FALLBACK_PATH`] artifact holding the whole input when no file block is
/// present. Never returns an empty list.
pub fn parse(markdown: &str) -> Vec<ParsedArtifact> {
    let files = parse_blocks(markdown);
    if files.is_empty() {
        return vec![ParsedArtifact::new(
            FALLBACK_PATH.to_string(),
            markdown.to_string(),
        )];
    }
    files
}

/// Parse only the well-formed file blocks, without the fallback artifact.
///
/// Blocks whose path or content is empty after trimming are skipped.
pub fn parse_blocks(markdown: &str) -> Vec<ParsedArtifact> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();

    for caps in BLOCK_RE.captures_iter(markdown) {
        let raw_path = clean_heading_path(caps.get(1).map_or("", |m| m.as_str()));
        let content = caps.get(2).map_or("", |m| m.as_str()).trim();
        if raw_path.is_empty() || content.is_empty() {
            continue;
        }

        let path = canonical_path(raw_path);
        if !seen.insert(path.clone()) {
            continue;
        }
        files.push(ParsedArtifact::new(path, content.to_string()));
    }

    files
}

/// Rewrite known bare root filenames under their side's namespace prefix.
///
/// `package.json` becomes `frontend/package.json`, `main.py` becomes
/// `backend/main.py`; every other path passes through unchanged.
pub fn canonical_path(path: &str) -> String {
    let p = path.trim().trim_matches('\'');
    if FRONTEND_ROOT_RE.is_match(p) {
        return format!("{FRONTEND_PREFIX}/{p}");
    }
    if BACKEND_ROOT_RE.is_match(p) {
        return format!("{BACKEND_PREFIX}/{p}");
    }
    p.to_string()
}

/// Strip decoration models like to wrap heading paths in.
fn clean_heading_path(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c| matches!(c, '`' | '*' | '"'))
        .trim()
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Serialize files back into the heading + fenced block format that
/// [`parse`] reads.
pub fn render<'a>(files: impl IntoIterator<Item = &'a SourceFile>) -> String {
    let mut out = String::new();
    for file in files {
        let lang = file.extension().unwrap_or("");
        out.push_str("#### ");
        out.push_str(&file.path);
        out.push_str("\n```");
        out.push_str(lang);
        out.push('\n');
        out.push_str(&file.content);
        out.push_str("\n```\n\n");
    }
    out
}
