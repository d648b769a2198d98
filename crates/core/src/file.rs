//! Plain `{path, content}` file pairs exchanged between components.

use serde::{Deserialize, Serialize};

/// One source file: a canonical path and its full text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Directory part of the path (`""` for root-level files).
    pub fn dir(&self) -> &str {
        self.path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }

    /// Extension after the last `.` of the file name, if any.
    pub fn extension(&self) -> Option<&str> {
        let name = self.path.rsplit('/').next().unwrap_or(&self.path);
        name.rsplit_once('.').map(|(_, ext)| ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_and_extension() {
        let f = SourceFile::new("frontend/src/App.tsx", "");
        assert_eq!(f.dir(), "frontend/src");
        assert_eq!(f.extension(), Some("tsx"));

        let root = SourceFile::new("README", "");
        assert_eq!(root.dir(), "");
        assert_eq!(root.extension(), None);
    }

    #[test]
    fn extension_ignores_dots_in_directories() {
        let f = SourceFile::new("some.dir/Makefile", "");
        assert_eq!(f.extension(), None);
    }
}
