// Filesystem path inspector
use std::fs;
use std::path::Path;
use tracing::debug;

use envprobe_core::domain::PathCheck;
use envprobe_core::port::PathInspector;

/// PathInspector over the real filesystem (follows symlinks)
#[derive(Debug, Default, Clone, Copy)]
pub struct FsPathInspector;

impl FsPathInspector {
    pub fn new() -> Self {
        Self
    }

    /// Names of regular files directly inside `dir`, sorted
    fn list_files(dir: &Path) -> std::io::Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            // metadata() follows symlinks, file_type() would not
            if fs::metadata(entry.path()).map(|m| m.is_file()).unwrap_or(false) {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        files.sort();
        Ok(files)
    }
}

impl PathInspector for FsPathInspector {
    fn inspect(&self, path: &Path, expected_children: &[String]) -> PathCheck {
        let shown = path.display().to_string();

        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(path = %shown, error = %e, "Path does not exist");
                return PathCheck::missing(shown, expected_children);
            }
        };

        let mut check = PathCheck {
            path: shown,
            exists: true,
            is_dir: metadata.is_dir(),
            is_file: metadata.is_file(),
            children: expected_children
                .iter()
                .map(|name| (name.clone(), metadata.is_dir() && path.join(name).exists()))
                .collect(),
            files: None,
            error: None,
        };

        if check.is_dir {
            match Self::list_files(path) {
                Ok(files) => check.files = Some(files),
                Err(e) => check.error = Some(format!("cannot list directory: {}", e)),
            }
        }

        debug!(
            path = %check.path,
            is_dir = check.is_dir,
            missing = ?check.missing_children(),
            "Path inspected"
        );

        check
    }
}
