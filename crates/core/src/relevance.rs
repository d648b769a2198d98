//! Relevance selection for edit requests.
//!
//! The generation service has a bounded context window and charges per call,
//! so an edit only carries the files plausibly related to the request. Files
//! are scored with additive keyword heuristics, ranked, expanded with
//! same-directory siblings, and capped.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::file::SourceFile;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default cap on files sent with one edit request.
pub const DEFAULT_MAX_FILES: usize = 12;

/// Score for a file whose path is mentioned in the request.
pub const SCORE_PATH_MENTION: u32 = 10;
/// Score for a file matched by a stack-trace path in the error text.
pub const SCORE_STACK_TRACE: u32 = 8;
/// Score for a stylesheet when the request talks about styling.
pub const SCORE_STYLE: u32 = 5;
/// Score for a UI-side file when the request talks about UI.
pub const SCORE_UI: u32 = 2;
/// Score for a server-side file when the request talks about the server.
pub const SCORE_SERVER: u32 = 2;
/// Flat bonus for conventional entry points.
pub const SCORE_ENTRY_POINT: u32 = 1;

static PATH_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[\w-]+/)*[\w.-]+\.(?:tsx|ts|jsx|js|css|scss|json|py|html)\b")
        .expect("valid regex")
});

static STACK_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:frontend|backend)?/?src/[\w/-]+\.(?:tsx|ts|jsx|js|css|json)")
        .expect("valid regex")
});

static STYLE_CUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"color|background|shadow|border|font|spacing|theme|dark|light|tailwind|css")
        .expect("valid regex")
});

static UI_CUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:components?|react|tsx|jsx|ui|buttons?|pages?|layouts?|frontend)\b")
        .expect("valid regex")
});

static SERVER_CUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:backend|api|server|express|python|fastapi|main\.py)\b")
        .expect("valid regex")
});

static STYLESHEET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\.(css|scss|sass|less)$|globals?\.css|index\.css|app\.css)")
        .expect("valid regex")
});

static UI_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(^|/)frontend/|\.(tsx|jsx|ts|js|css)$").expect("valid regex")
});

static SERVER_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(^|/)backend/|main\.py$").expect("valid regex"));

static ENTRY_POINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|/)(App\.(tsx|jsx|js)|index\.(tsx|jsx|js|css)|main\.(tsx|jsx|js))$")
        .expect("valid regex")
});

// ---------------------------------------------------------------------------
// Cues
// ---------------------------------------------------------------------------

/// Signals extracted once from the request text.
#[derive(Debug, Default)]
struct Cues {
    /// Lowercased instructions and error text, joined.
    text: String,
    path_tokens: Vec<String>,
    stack_paths: Vec<String>,
    style: bool,
    ui: bool,
    server: bool,
}

impl Cues {
    fn extract(instructions: Option<&str>, error_text: Option<&str>) -> Self {
        let error_lower = error_text.unwrap_or("").to_lowercase();
        let text = format!("{}\n\n{}", instructions.unwrap_or("").to_lowercase(), error_lower);

        let path_tokens = PATH_TOKEN_RE
            .find_iter(&text)
            .map(|m| normalize_token(m.as_str()))
            .filter(|t| !t.is_empty())
            .collect();

        let stack_paths = STACK_PATH_RE
            .find_iter(&error_lower)
            .map(|m| normalize_token(m.as_str()))
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            style: STYLE_CUE_RE.is_match(&text),
            ui: UI_CUE_RE.is_match(&text),
            server: SERVER_CUE_RE.is_match(&text),
            text,
            path_tokens,
            stack_paths,
        }
    }

    /// A path is mentioned when a path-looking token is a substring of it, or
    /// when the whole path appears literally in the text.
    fn mentions(&self, path_lower: &str) -> bool {
        if self.path_tokens.iter().any(|t| path_lower.contains(t.as_str())) {
            return true;
        }
        let path_like = path_lower.contains('/') || path_lower.contains('.');
        path_like && self.text.contains(path_lower)
    }

    fn score(&self, file: &SourceFile) -> u32 {
        let path = file.path.to_lowercase();
        let mut score = 0;

        if self.mentions(&path) {
            score += SCORE_PATH_MENTION;
        }
        if self.stack_paths.iter().any(|t| path.contains(t.as_str())) {
            score += SCORE_STACK_TRACE;
        }
        if self.style && STYLESHEET_RE.is_match(&file.path) {
            score += SCORE_STYLE;
        }
        if self.ui && UI_FILE_RE.is_match(&file.path) {
            score += SCORE_UI;
        }
        if self.server && SERVER_FILE_RE.is_match(&file.path) {
            score += SCORE_SERVER;
        }
        if is_entry_point(&file.path) {
            score += SCORE_ENTRY_POINT;
        }
        score
    }
}

fn normalize_token(token: &str) -> String {
    token
        .trim_start_matches("./")
        .trim_start_matches('/')
        .to_string()
}

/// Whether the path names a conventional entry point (app root, index, main).
pub fn is_entry_point(path: &str) -> bool {
    ENTRY_POINT_RE.is_match(path)
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Select at most `max_files` files relevant to an edit request.
///
/// Never returns an empty selection for non-empty input. A `max_files` of
/// zero is treated as one.
pub fn select<'a>(
    files: &'a [SourceFile],
    instructions: Option<&str>,
    error_text: Option<&str>,
    max_files: usize,
) -> Vec<&'a SourceFile> {
    let max_files = max_files.max(1);
    if files.is_empty() {
        return Vec::new();
    }

    let cues = Cues::extract(instructions, error_text);
    let mut ranked: Vec<(u32, &SourceFile)> = files.iter().map(|f| (cues.score(f), f)).collect();
    // `sort_by` is stable, so ties keep their original order.
    ranked.sort_by(|a, b| b.0.cmp(&a.0));

    let top_score = ranked.first().map_or(0, |(s, _)| *s);
    let ordered: Vec<&SourceFile> = if top_score == 0 {
        let entries: Vec<&SourceFile> = files.iter().filter(|f| is_entry_point(&f.path)).collect();
        if entries.is_empty() {
            files.iter().take(max_files).collect()
        } else {
            entries
        }
    } else {
        ranked.into_iter().map(|(_, f)| f).collect()
    };

    expand_with_siblings(files, ordered, cues.style, max_files)
}

/// Append same-directory siblings after each selected file.
///
/// A sibling qualifies when it shares the parent's extension, or always when
/// styling vocabulary was detected.
fn expand_with_siblings<'a>(
    files: &'a [SourceFile],
    ordered: Vec<&'a SourceFile>,
    any_sibling: bool,
    max_files: usize,
) -> Vec<&'a SourceFile> {
    let mut by_dir: HashMap<&str, Vec<&SourceFile>> = HashMap::new();
    for f in files {
        by_dir.entry(f.dir()).or_default().push(f);
    }

    let mut picked: Vec<&SourceFile> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for parent in ordered {
        if picked.len() >= max_files {
            break;
        }
        if seen.insert(parent.path.as_str()) {
            picked.push(parent);
        }

        let siblings = by_dir.get(parent.dir()).map(Vec::as_slice).unwrap_or(&[]);
        for sibling in siblings {
            if picked.len() >= max_files {
                break;
            }
            if sibling.path == parent.path {
                continue;
            }
            if (any_sibling || sibling.extension() == parent.extension())
                && seen.insert(sibling.path.as_str())
            {
                picked.push(sibling);
            }
        }
    }

    picked.truncate(max_files);
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(paths: &[&str]) -> Vec<SourceFile> {
        paths.iter().map(|p| SourceFile::new(*p, "x")).collect()
    }

    fn paths<'a>(selected: &[&'a SourceFile]) -> Vec<&'a str> {
        selected.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn mentioned_path_ranks_first() {
        let input = files(&[
            "frontend/src/App.tsx",
            "frontend/src/components/Navbar.tsx",
            "backend/src/server.ts",
        ]);

        let selected = select(&input, Some("Make components/Navbar.tsx sticky"), None, 12);

        assert_eq!(selected[0].path, "frontend/src/components/Navbar.tsx");
    }

    #[test]
    fn literal_path_without_extension_ranks_first() {
        let input = files(&["app/Home", "app/App", "lib/util"]);

        let selected = select(&input, Some("rename the button in app/App"), None, 1);

        assert_eq!(paths(&selected), vec!["app/App"]);
    }

    #[test]
    fn stack_trace_paths_score() {
        let input = files(&["frontend/src/pages/Home.tsx", "frontend/src/pages/About.tsx"]);

        let selected = select(
            &input,
            None,
            Some("TypeError: x is undefined\n    at /src/pages/About.tsx:12:5"),
            1,
        );

        assert_eq!(paths(&selected), vec!["frontend/src/pages/About.tsx"]);
    }

    #[test]
    fn styling_vocabulary_prefers_stylesheets() {
        let input = files(&[
            "backend/src/server.ts",
            "frontend/src/styles/theme.scss",
            "frontend/src/index.css",
        ]);

        let selected = select(&input, Some("change the background color"), None, 2);

        assert_eq!(selected[0].path, "frontend/src/index.css");
        assert!(paths(&selected).contains(&"frontend/src/styles/theme.scss"));
    }

    #[test]
    fn server_vocabulary_prefers_backend_files() {
        let input = files(&["frontend/src/Login.tsx", "backend/routes/users.py"]);

        let selected = select(&input, Some("add a users endpoint to the api"), None, 1);

        assert_eq!(paths(&selected), vec!["backend/routes/users.py"]);
    }

    #[test]
    fn entry_point_leads_without_other_signal() {
        let input = files(&[
            "frontend/src/utils/format.ts",
            "frontend/src/App.tsx",
            "README.md",
        ]);

        let selected = select(&input, Some("make it better"), None, 1);
        assert_eq!(paths(&selected), vec!["frontend/src/App.tsx"]);
    }

    #[test]
    fn no_signal_and_no_entry_points_takes_first_files() {
        let input = files(&["docs/a.md", "docs/b.md", "notes/c.txt"]);

        let selected = select(&input, Some("hello"), None, 2);

        assert_eq!(paths(&selected), vec!["docs/a.md", "docs/b.md"]);
    }

    #[test]
    fn siblings_with_same_extension_follow_parent() {
        let input = files(&[
            "frontend/src/components/Card.tsx",
            "frontend/src/components/card.css",
            "frontend/src/components/Button.tsx",
            "frontend/src/lib/api.ts",
        ]);

        let selected = select(&input, Some("fix components/Button.tsx"), None, 12);

        assert_eq!(
            paths(&selected),
            vec![
                "frontend/src/components/Button.tsx",
                "frontend/src/components/Card.tsx",
                "frontend/src/components/card.css",
                "frontend/src/lib/api.ts",
            ]
        );
    }

    #[test]
    fn styling_pulls_any_sibling() {
        let input = files(&[
            "frontend/src/components/Card.tsx",
            "frontend/src/components/card.css",
        ]);

        let selected = select(&input, Some("card shadow is too dark"), None, 12);

        assert_eq!(
            paths(&selected),
            vec!["frontend/src/components/card.css", "frontend/src/components/Card.tsx"]
        );
    }

    #[test]
    fn selection_is_capped_and_unique() {
        let input: Vec<SourceFile> = (0..40)
            .map(|i| SourceFile::new(format!("frontend/src/c{i}.tsx"), "x"))
            .collect();

        let selected = select(&input, Some("react component tweaks"), None, 5);

        assert_eq!(selected.len(), 5);
        let unique: HashSet<_> = selected.iter().map(|f| &f.path).collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn non_empty_input_never_yields_empty_selection() {
        let input = files(&["x"]);
        assert_eq!(select(&input, None, None, 0).len(), 1);
        assert!(select(&[], Some("anything"), None, 3).is_empty());
    }
}
