//! Cached key/value settings persisted as JSON
//!
//! A thin wrapper around one settings file, used by callers for window
//! geometry and similar small preferences. Reads are served from an
//! in-memory cache that writes through to disk, so a value stored a
//! moment ago always reads back, whatever the backing file is doing.
//! Missing or wrongly-typed values read as benign defaults and never
//! error.

use crate::error::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Persisted settings with a write-through cache
pub struct Settings {
    path: PathBuf,
    cache: HashMap<String, Value>,
}

impl Settings {
    /// Open a settings file, loading existing values into the cache
    ///
    /// A missing file yields empty settings; a file that exists but
    /// does not parse is surfaced as an error so the caller can decide
    /// to start fresh.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            HashMap::new()
        };
        Ok(Self { path, cache })
    }

    /// The backing file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Read an integer value; missing or non-integer keys read as 0
    pub fn get_int(&self, key: &str) -> i64 {
        self.cache.get(key).and_then(Value::as_i64).unwrap_or(0)
    }

    /// Read a string value; missing or non-string keys read as ""
    pub fn get_string(&self, key: &str) -> String {
        self.cache
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Store an integer value and flush to disk
    pub fn set_int(&mut self, key: &str, value: i64) -> Result<()> {
        self.cache.insert(key.to_string(), Value::from(value));
        self.flush()
    }

    /// Store a string value and flush to disk
    pub fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.cache.insert(key.to_string(), Value::from(value));
        self.flush()
    }

    // Atomic write: temp file in the same directory, then rename.
    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.cache)?;
        let temp_path = self.path.with_extension(format!(
            "{}.tmp",
            self.path
                .extension()
                .and_then(|s| s.to_str())
                .unwrap_or("")
        ));
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings_in(dir: &TempDir) -> Settings {
        Settings::open(dir.path().join("settings.json")).unwrap()
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);
        assert_eq!(settings.get_int("saved-width"), 0);
        assert_eq!(settings.get_string("notes-dir"), "");
    }

    #[test]
    fn test_set_then_get() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings_in(&dir);
        settings.set_int("saved-width", 800).unwrap();
        settings.set_int("saved-height", 600).unwrap();
        settings.set_string("notes-dir", "/home/liw/notes").unwrap();

        assert_eq!(settings.get_int("saved-width"), 800);
        assert_eq!(settings.get_int("saved-height"), 600);
        assert_eq!(settings.get_string("notes-dir"), "/home/liw/notes");
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        {
            let mut settings = Settings::open(&path).unwrap();
            settings.set_int("saved-panedpos", 240).unwrap();
        }
        let settings = Settings::open(&path).unwrap();
        assert_eq!(settings.get_int("saved-panedpos"), 240);
    }

    #[test]
    fn test_non_integer_value_reads_as_zero() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings_in(&dir);
        settings.set_string("saved-width", "wide").unwrap();
        assert_eq!(settings.get_int("saved-width"), 0);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json at all").unwrap();
        assert!(Settings::open(&path).is_err());
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = Settings::open(&path).unwrap();
        assert_eq!(settings.path(), &path);
        settings.set_int("saved-width", 1).unwrap();
        assert!(settings.path().exists());
    }
}
