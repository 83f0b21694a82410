// Filesystem path check result
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of checking one filesystem path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathCheck {
    pub path: String,
    pub exists: bool,
    pub is_dir: bool,
    pub is_file: bool,
    /// Expected entries inside the directory and whether each exists
    pub children: BTreeMap<String, bool>,
    /// Regular files directly inside the directory, sorted by name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    /// Why the directory could not be listed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PathCheck {
    /// A path that does not exist; every expected child is missing
    pub fn missing(path: impl Into<String>, expected: &[String]) -> Self {
        Self {
            path: path.into(),
            children: expected.iter().map(|name| (name.clone(), false)).collect(),
            ..Default::default()
        }
    }

    /// True when the path exists and every expected child does too
    pub fn is_complete(&self) -> bool {
        self.exists && self.children.values().all(|present| *present)
    }

    pub fn missing_children(&self) -> Vec<&str> {
        self.children
            .iter()
            .filter(|(_, present)| !**present)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_marks_children_absent() {
        let check = PathCheck::missing("/opt/mcp", &["server.py".to_string()]);
        assert!(!check.exists);
        assert!(!check.is_complete());
        assert_eq!(check.missing_children(), vec!["server.py"]);
    }

    #[test]
    fn test_files_omitted_from_json_when_not_listed() {
        let check = PathCheck::missing("/opt/mcp", &[]);
        let value = serde_json::to_value(&check).unwrap();
        assert_eq!(value["exists"], false);
        assert!(value.get("files").is_none());
    }
}
