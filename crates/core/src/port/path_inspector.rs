// Path Inspector Port
// Existence checks for directories and files the diagnosis depends on

use crate::domain::PathCheck;
use std::path::Path;

/// Filesystem inspection trait
pub trait PathInspector: Send + Sync {
    /// Stat `path`; for a directory, list its regular files and check
    /// each of `expected_children`
    fn inspect(&self, path: &Path, expected_children: &[String]) -> PathCheck;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::BTreeMap;

    /// Mock inspector over a fixed set of directories and their files
    #[derive(Default)]
    pub struct MockPathInspector {
        directories: BTreeMap<String, Vec<String>>,
    }

    impl MockPathInspector {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dir<I, S>(mut self, path: impl Into<String>, files: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.directories
                .insert(path.into(), files.into_iter().map(Into::into).collect());
            self
        }
    }

    impl PathInspector for MockPathInspector {
        fn inspect(&self, path: &Path, expected_children: &[String]) -> PathCheck {
            let key = path.display().to_string();
            match self.directories.get(&key) {
                Some(files) => PathCheck {
                    path: key,
                    exists: true,
                    is_dir: true,
                    is_file: false,
                    children: expected_children
                        .iter()
                        .map(|name| (name.clone(), files.contains(name)))
                        .collect(),
                    files: Some(files.clone()),
                    error: None,
                },
                None => PathCheck::missing(key, expected_children),
            }
        }
    }
}
