//! Virtual path resolution.
//!
//! Every file in a preview set lives under a virtual root `/`. Specifiers are
//! resolved against the importing file's directory and normalized; a module
//! exists when the literal path, the path plus a source extension, or an
//! `index` file beneath it is present.

use std::collections::BTreeSet;

/// Extensions tried, in order, when a specifier omits one.
pub const SOURCE_EXTENSIONS: &[&str] = &["tsx", "ts", "jsx", "js", "mjs", "cjs", "json"];

/// Map a file-set key onto the virtual root (`src/a.ts` -> `/src/a.ts`).
pub fn to_virtual(key: &str) -> String {
    format!("/{}", key.trim_start_matches('/'))
}

/// Directory of a virtual path (`/src/a.ts` -> `/src`, `/a.ts` -> `/`).
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

/// Resolve `specifier` against the file at `importer` into a normalized
/// absolute virtual path. `..` never climbs above the root. Query and hash
/// suffixes (`?raw`, `#x`) are dropped.
pub fn resolve_specifier(importer: &str, specifier: &str) -> String {
    let specifier = specifier
        .split(['?', '#'])
        .next()
        .unwrap_or(specifier);

    let joined = if specifier.starts_with('/') {
        specifier.to_string()
    } else {
        format!("{}/{}", parent_dir(importer), specifier)
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Find the file a resolved path refers to, if any.
pub fn find_existing(existing: &BTreeSet<String>, resolved: &str) -> Option<String> {
    if existing.contains(resolved) {
        return Some(resolved.to_string());
    }
    for ext in SOURCE_EXTENSIONS {
        let candidate = format!("{resolved}.{ext}");
        if existing.contains(&candidate) {
            return Some(candidate);
        }
    }
    let base = resolved.trim_end_matches('/');
    for ext in SOURCE_EXTENSIONS {
        let candidate = format!("{base}/index.{ext}");
        if existing.contains(&candidate) {
            return Some(candidate);
        }
    }
    None
}
