// PATH-like variable decomposition
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Separator between entries of the search path on this platform
#[cfg(windows)]
pub const PATH_SEPARATOR: &str = ";";
#[cfg(not(windows))]
pub const PATH_SEPARATOR: &str = ":";

/// Name of the search path variable
pub const PATH_VAR: &str = "PATH";

/// Entries of a PATH-like string, in their original order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathListing {
    pub entries: Vec<String>,
}

/// Split a PATH-like string on `separator`
///
/// An empty string has no entries. Otherwise every segment is kept, empty
/// ones included, so that splitting a joined list gives the list back.
/// An empty separator leaves `raw` as the single entry.
pub fn decompose_path(raw: &str, separator: &str) -> PathListing {
    let entries = if raw.is_empty() {
        Vec::new()
    } else if separator.is_empty() {
        vec![raw.to_string()]
    } else {
        raw.split(separator).map(str::to_string).collect()
    };

    PathListing { entries }
}

impl PathListing {
    /// Decompose `var` from an explicit environment map
    ///
    /// Lookup is case-insensitive when the exact key is absent (Windows
    /// spells it `Path`). A missing variable yields an empty listing.
    pub fn from_env(env: &HashMap<String, String>, var: &str) -> Self {
        let raw = env.get(var).or_else(|| {
            env.iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(var))
                .map(|(_, value)| value)
        });

        match raw {
            Some(raw) => decompose_path(raw, PATH_SEPARATOR),
            None => Self::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries containing `keyword`, compared case-insensitively
    pub fn filtered_by(&self, keyword: &str) -> Vec<String> {
        let needle = keyword.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Log payload: `{"paths": [...], "<keyword>_paths": [...]}`
    pub fn report(&self, keywords: &[String]) -> Value {
        let mut payload = Map::new();
        payload.insert("paths".to_string(), Value::from(self.entries.clone()));
        for keyword in keywords {
            payload.insert(
                format!("{}_paths", keyword.to_lowercase()),
                Value::from(self.filtered_by(keyword)),
            );
        }
        Value::Object(payload)
    }
}
