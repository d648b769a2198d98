//! Import specifier extraction.
//!
//! One pure function per reference syntax; [`local_specifiers`] concatenates
//! their results and keeps only local (relative or root-absolute) specifiers.

use std::sync::LazyLock;

use regex::Regex;

/// `import x from '...'`, `import '...'`, `export { x } from '...'`, `export * from '...'`.
///
/// A statement starts a line or follows `;` or `}` on the same line.
static STATIC_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)(?:^|[;}])[ \t]*(?:import|export)\s+(?:[^'";]*?\s+from\s+)?['"]([^'"\n]+)['"]"#)
        .expect("valid regex")
});

/// `import('...')`
static DYNAMIC_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).expect("valid regex")
});

/// `require('...')`
static REQUIRE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brequire\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).expect("valid regex")
});

/// `@import './x.css';` and `@import url("./x.css");`
static CSS_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@import\s+(?:url\(\s*)?['"]([^'"\n]+)['"]"#).expect("valid regex")
});

fn captures(re: &Regex, source: &str) -> Vec<String> {
    re.captures_iter(source)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn static_imports(source: &str) -> Vec<String> {
    captures(&STATIC_IMPORT_RE, source)
}

pub fn dynamic_imports(source: &str) -> Vec<String> {
    captures(&DYNAMIC_IMPORT_RE, source)
}

pub fn require_calls(source: &str) -> Vec<String> {
    captures(&REQUIRE_RE, source)
}

pub fn css_imports(source: &str) -> Vec<String> {
    captures(&CSS_IMPORT_RE, source)
}

/// Whether a specifier names a module inside the project rather than a package.
pub fn is_local(specifier: &str) -> bool {
    if specifier.starts_with("//") {
        return false;
    }
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
        || specifier == "."
        || specifier == ".."
}

/// Extension classes the resolver scans for references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Script,
    Stylesheet,
    Other,
}

impl SourceKind {
    pub fn of(path: &str) -> Self {
        let ext = path
            .rsplit('/')
            .next()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("js" | "jsx" | "ts" | "tsx" | "mjs" | "cjs" | "mts" | "cts") => Self::Script,
            Some("css" | "scss" | "sass" | "less") => Self::Stylesheet,
            _ => Self::Other,
        }
    }
}

/// Every local specifier referenced by a file, in syntax order, deduplicated.
pub fn local_specifiers(path: &str, source: &str) -> Vec<String> {
    let all = match SourceKind::of(path) {
        SourceKind::Script => {
            let mut found = static_imports(source);
            found.extend(dynamic_imports(source));
            found.extend(require_calls(source));
            found
        }
        SourceKind::Stylesheet => css_imports(source),
        SourceKind::Other => Vec::new(),
    };

    let mut out: Vec<String> = Vec::new();
    for spec in all {
        if is_local(&spec) && !out.contains(&spec) {
            out.push(spec);
        }
    }
    out
}
