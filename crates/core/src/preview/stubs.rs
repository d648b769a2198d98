//! Stand-in modules for unresolved imports.
//!
//! A missing module is classified by directory and naming convention and
//! replaced with a static, convention-shaped placeholder. Stub content is a
//! pure function of the classification and the module name, and never
//! imports another local module.

use serde::Serialize;

/// Convention a missing module is assumed to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StubKind {
    ApiClient,
    Store,
    Hook,
    Types,
    Component,
    Stylesheet,
    Json,
    Generic,
}

impl StubKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiClient => "api_client",
            Self::Store => "store",
            Self::Hook => "hook",
            Self::Types => "types",
            Self::Component => "component",
            Self::Stylesheet => "stylesheet",
            Self::Json => "json",
            Self::Generic => "generic",
        }
    }
}

impl std::fmt::Display for StubKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language family of the importing file; picks the stub's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFamily {
    TypeScript,
    JavaScript,
}

impl ScriptFamily {
    pub fn of(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        if [".ts", ".tsx", ".mts", ".cts"].iter().any(|e| lower.ends_with(e)) {
            Self::TypeScript
        } else {
            Self::JavaScript
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Known extensions a specifier may already carry.
const EXPLICIT_EXTENSIONS: &[&str] = &[
    "tsx", "ts", "jsx", "js", "mjs", "cjs", "json", "css", "scss", "sass", "less",
];

/// Split a resolved virtual path into its directories, module name, and
/// explicit extension (if it carries a known one).
fn split_target(path: &str) -> (Vec<&str>, &str, Option<&str>) {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let last = segments.pop().unwrap_or("index");

    let (mut name, ext) = match last.rsplit_once('.') {
        Some((stem, ext)) if EXPLICIT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) => {
            (stem, Some(ext))
        }
        _ => (last, None),
    };
    // `types.d` from `types.d.ts`
    name = name.strip_suffix(".d").unwrap_or(name);

    // `.../users/index` is named after its directory.
    if name == "index" {
        if let Some(parent) = segments.last() {
            name = parent;
        }
    }
    (segments, name, ext)
}

fn kind_for_dir(segment: &str) -> Option<StubKind> {
    match segment.to_ascii_lowercase().as_str() {
        "api" | "apis" | "services" | "service" | "client" | "clients" => Some(StubKind::ApiClient),
        "store" | "stores" | "state" | "redux" | "slices" | "context" | "contexts" => {
            Some(StubKind::Store)
        }
        "hooks" | "hook" | "composables" => Some(StubKind::Hook),
        "types" | "@types" | "typings" | "interfaces" | "models" => Some(StubKind::Types),
        "components" | "component" | "pages" | "views" | "layouts" | "layout" | "screens"
        | "ui" | "widgets" | "sections" => Some(StubKind::Component),
        _ => None,
    }
}

/// Classify a missing module from its resolved virtual path.
pub fn classify(path: &str) -> StubKind {
    let (dirs, name, ext) = split_target(path);
    let is_declaration = path.ends_with(".d.ts") || path.ends_with(".d");

    match ext.map(str::to_ascii_lowercase).as_deref() {
        Some("css" | "scss" | "sass" | "less") => return StubKind::Stylesheet,
        Some("json") => return StubKind::Json,
        _ => {}
    }
    if is_declaration {
        return StubKind::Types;
    }
    if is_hook_name(name) {
        return StubKind::Hook;
    }
    if let Some(kind) = dirs.iter().rev().find_map(|d| kind_for_dir(d)) {
        return kind;
    }

    let lower = name.to_ascii_lowercase();
    if lower.contains("store") || lower.ends_with("slice") {
        StubKind::Store
    } else if lower.ends_with("api") || lower.ends_with("service") || lower.ends_with("client") {
        StubKind::ApiClient
    } else if lower == "types" || lower.ends_with("types") {
        StubKind::Types
    } else if name.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
        StubKind::Component
    } else {
        StubKind::Generic
    }
}

fn is_hook_name(name: &str) -> bool {
    name.strip_prefix("use")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Virtual path the stub for `resolved` is written to.
///
/// Paths with an explicit known extension are used as-is; otherwise an
/// extension matching the stub kind and importer family is appended.
pub fn stub_path(resolved: &str, kind: StubKind, family: ScriptFamily) -> String {
    let (_, _, ext) = split_target(resolved);
    if ext.is_some() {
        return resolved.to_string();
    }
    let ext = match (kind, family) {
        (StubKind::Component, ScriptFamily::TypeScript) => "tsx",
        (StubKind::Component, ScriptFamily::JavaScript) => "jsx",
        (_, ScriptFamily::TypeScript) => "ts",
        (_, ScriptFamily::JavaScript) => "js",
    };
    format!("{}.{ext}", resolved.trim_end_matches('/'))
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

/// Turn an arbitrary module name into a PascalCase JavaScript identifier.
pub fn pascal_identifier(name: &str) -> String {
    let mut out = String::new();
    let mut upper_next = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if upper_next {
                out.push(c.to_ascii_uppercase());
                upper_next = false;
            } else {
                out.push(c);
            }
        } else {
            upper_next = true;
        }
    }
    if out.is_empty() {
        return "Placeholder".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Rename `ident` when it would shadow a name the stub template declares.
fn avoid_reserved(ident: String, reserved: &[&str]) -> String {
    if reserved.contains(&ident.as_str()) {
        format!("{ident}Placeholder")
    } else {
        ident
    }
}

/// `useThing` names keep their spelling; anything else becomes `use{Pascal}`.
fn hook_identifier(name: &str) -> String {
    if is_hook_name(name) && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("use{}", pascal_identifier(name))
    }
}

/// Synthesize the stub module for a classified missing import.
///
/// `path` is the stub's own virtual path; only its module name and
/// extension influence the content.
pub fn synthesize(kind: StubKind, path: &str) -> String {
    let (_, name, ext) = split_target(path);
    let family = ScriptFamily::of(path);
    match kind {
        StubKind::ApiClient => api_client_stub(name),
        StubKind::Store => store_stub(name),
        StubKind::Hook => hook_stub(name),
        StubKind::Types => types_stub(name, family, ext),
        StubKind::Component => component_stub(name),
        StubKind::Stylesheet => format!("/* Preview placeholder stylesheet for \"{name}\". */\n"),
        StubKind::Json => "{}\n".to_string(),
        StubKind::Generic => generic_stub(name),
    }
}

fn api_client_stub(name: &str) -> String {
    format!(
        r#"// Preview placeholder API client for "{name}".
export async function fetchData() {{
  return [];
}}

export async function fetchById(id) {{
  return null;
}}

export async function createItem(data) {{
  return {{ ...(data || {{}}), id: "preview" }};
}}

export async function updateItem(id, data) {{
  return {{ ...(data || {{}}), id }};
}}

export async function deleteItem(id) {{
  return {{ id, deleted: true }};
}}

const api = {{ fetchData, fetchById, createItem, updateItem, deleteItem }};
export default api;
"#
    )
}

fn store_stub(name: &str) -> String {
    let hook = hook_identifier(name);
    let alias = if hook == "useStore" {
        String::new()
    } else {
        format!("export const useStore = {hook};\n")
    };
    format!(
        r#"// Preview placeholder store for "{name}".
const state = {{
  data: null,
  loading: false,
  error: null,
  setData: () => {{}},
  setLoading: () => {{}},
  setError: () => {{}},
  reset: () => {{}},
}};

export function {hook}(selector) {{
  return typeof selector === "function" ? selector(state) : state;
}}

{alias}export default {hook};
"#
    )
}

fn hook_stub(name: &str) -> String {
    let hook = hook_identifier(name);
    format!(
        r#"// Preview placeholder hook for "{name}".
export function {hook}() {{
  return {{ data: null, loading: false, error: null }};
}}

export default {hook};
"#
    )
}

fn types_stub(name: &str, family: ScriptFamily, ext: Option<&str>) -> String {
    let is_json_like = ext.is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if family == ScriptFamily::JavaScript || is_json_like {
        return format!("// Preview placeholder types for \"{name}\".\nexport default {{}};\n");
    }
    let ident = avoid_reserved(pascal_identifier(name), &["AnyRecord"]);
    format!(
        r#"// Preview placeholder types for "{name}".
export interface {ident}<T = any> {{
  [key: string]: T;
}}

export type AnyRecord = Record<string, any>;

const types = {{}};
export default types;
"#
    )
}

fn component_stub(name: &str) -> String {
    let ident = avoid_reserved(pascal_identifier(name), &["React"]);
    format!(
        r##"import React from "react";

// Preview placeholder component for "{name}".
export function {ident}(props) {{
  return (
    <div
      data-preview-placeholder="{ident}"
      style={{{{ padding: 12, margin: 4, border: "1px dashed #9ca3af", borderRadius: 6, color: "#6b7280", fontFamily: "sans-serif" }}}}
    >
      {ident} (placeholder)
      {{props && props.children}}
    </div>
  );
}}

export default {ident};
"##
    )
}

fn generic_stub(name: &str) -> String {
    format!(
        r#"// Preview placeholder module for "{name}".
export function noop() {{}}

export const data = {{}};
export const items = [];

export default noop;
"#
    )
}
