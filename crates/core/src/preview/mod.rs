//! Preview module closure.
//!
//! Generated projects regularly import local modules the model never
//! emitted. Before a snapshot reaches the in-browser bundler every local
//! import must resolve, so [`close`] walks the import graph once, synthesizes
//! a stand-in for each gap, then walks the augmented set again to verify.

pub mod imports;
pub mod resolve;
pub mod stubs;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use self::imports::local_specifiers;
use self::resolve::{find_existing, resolve_specifier, to_virtual};
use self::stubs::{classify, stub_path, synthesize, ScriptFamily, StubKind};

/// Namespace the bundler treats as the web root.
pub const SANDBOX_ROOT_PREFIX: &str = "frontend/";

/// One module added by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesizedStub {
    /// Key of the stub in [`Closure::files`].
    pub path: String,
    pub kind: StubKind,
    /// File whose import first exposed the gap.
    pub requested_by: String,
    pub specifier: String,
}

/// Result of closing a file set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Closure {
    /// Original files plus synthesized stubs.
    pub files: BTreeMap<String, String>,
    pub stubs: Vec<SynthesizedStub>,
    /// True when the verification pass found no remaining gaps.
    pub verified: bool,
}

/// Complete the local-import graph of `files`.
///
/// Keys may be written with or without a leading `/`; both map onto the same
/// virtual root. A stub key follows the style of the file that requested it.
pub fn close(files: &BTreeMap<String, String>) -> Closure {
    let mut augmented = files.clone();
    let mut stubs = Vec::new();

    fill_gaps(&mut augmented, &mut stubs);
    let remaining = fill_gaps(&mut augmented, &mut stubs);

    Closure {
        files: augmented,
        stubs,
        verified: remaining == 0,
    }
}

/// One scan over `files`. Returns how many stubs were added.
fn fill_gaps(files: &mut BTreeMap<String, String>, stubs: &mut Vec<SynthesizedStub>) -> usize {
    let mut existing: BTreeSet<String> = files.keys().map(|k| to_virtual(k)).collect();
    let mut additions: Vec<(String, String)> = Vec::new();

    for (key, content) in files.iter() {
        let importer = to_virtual(key);
        for specifier in local_specifiers(&importer, content) {
            let resolved = resolve_specifier(&importer, &specifier);
            if resolved == "/" || find_existing(&existing, &resolved).is_some() {
                continue;
            }

            let kind = classify(&resolved);
            let virtual_path = stub_path(&resolved, kind, ScriptFamily::of(&importer));
            if !existing.insert(virtual_path.clone()) {
                continue;
            }

            let stub_key = if key.starts_with('/') {
                virtual_path.clone()
            } else {
                virtual_path.trim_start_matches('/').to_string()
            };
            additions.push((stub_key.clone(), synthesize(kind, &virtual_path)));
            stubs.push(SynthesizedStub {
                path: stub_key,
                kind,
                requested_by: key.clone(),
                specifier,
            });
        }
    }

    let added = additions.len();
    files.extend(additions);
    added
}

/// Map a stored snapshot onto the bundler's virtual file system and close it.
///
/// When the snapshot carries a `frontend/` tree only that tree is previewed,
/// mounted at `/`; otherwise every file is mounted under `/` as-is.
pub fn prepare_sandbox(snapshot: &BTreeMap<String, String>) -> Closure {
    let has_frontend = snapshot.keys().any(|k| k.starts_with(SANDBOX_ROOT_PREFIX));

    let mounted: BTreeMap<String, String> = snapshot
        .iter()
        .filter_map(|(path, content)| {
            let mounted = if has_frontend {
                to_virtual(path.strip_prefix(SANDBOX_ROOT_PREFIX)?)
            } else {
                to_virtual(path)
            };
            Some((mounted, content.clone()))
        })
        .collect();

    close(&mounted)
}
