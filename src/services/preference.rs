// Persisted auto-start decision

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The operator's auto-start answer. `wants_auto_start` means nothing until
/// `asked_already` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupPreference {
    pub asked_already: bool,
    pub wants_auto_start: bool,
}

impl StartupPreference {
    pub fn wants_auto_start(&self) -> bool {
        self.asked_already && self.wants_auto_start
    }
}

pub trait PreferenceStore: Send + Sync {
    /// Returns the default record when nothing has been stored yet.
    fn load(&self) -> io::Result<StartupPreference>;
    fn save(&self, preference: &StartupPreference) -> io::Result<()>;
}

/// Keeps the preference as a small pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonPreferenceStore {
    path: PathBuf,
}

impl JsonPreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn load(&self) -> io::Result<StartupPreference> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(StartupPreference::default()),
            Err(e) => return Err(e),
        };

        serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn save(&self, preference: &StartupPreference) -> io::Result<()> {
        let content = serde_json::to_string_pretty(preference)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Whole-file replace so a crash never leaves half a record behind.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_undecided_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPreferenceStore::new(dir.path().join("startup.json"));

        let preference = store.load().unwrap();
        assert_eq!(preference, StartupPreference::default());
        assert!(!preference.wants_auto_start());
    }

    #[test]
    fn saved_record_uses_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPreferenceStore::new(dir.path().join("nested").join("startup.json"));
        let preference = StartupPreference {
            asked_already: true,
            wants_auto_start: true,
        };

        store.save(&preference).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"askedAlready\": true"));
        assert!(raw.contains("\"wantsAutoStart\": true"));
        assert_eq!(store.load().unwrap(), preference);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("startup.json");
        fs::write(&path, "{not json").unwrap();

        let err = JsonPreferenceStore::new(path).load().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn undecided_record_ignores_stale_wish() {
        let preference = StartupPreference {
            asked_already: false,
            wants_auto_start: true,
        };
        assert!(!preference.wants_auto_start());
    }
}
