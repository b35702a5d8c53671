//! JSON file backed settings store.
//!
//! The whole key → array map lives in one JSON document. Every mutation
//! rewrites it through a temporary file followed by a rename, so a crash never
//! leaves a half-written settings file behind.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use parking_lot::Mutex;

use crate::error::{Result, SuggestError};
use crate::settings::SettingsStore;

/// Settings persisted to a JSON file.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    arrays: Mutex<BTreeMap<String, Vec<String>>>,
}

impl FileSettingsStore {
    /// Open the settings file, creating parent directories as needed. A missing
    /// file starts out empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    SuggestError::settings(format!(
                        "Failed to create settings directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let arrays = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    SuggestError::settings(format!(
                        "Malformed settings file {}: {e}",
                        path.display()
                    ))
                })?
            }
        } else {
            BTreeMap::new()
        };

        debug!("Opened settings file {} ({} keys)", path.display(), arrays.len());
        Ok(FileSettingsStore {
            path,
            arrays: Mutex::new(arrays),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, arrays: &BTreeMap<String, Vec<String>>) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(arrays)?)?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            SuggestError::settings(format!(
                "Failed to write settings file {}: {e}",
                self.path.display()
            ))
        })
    }
}

impl SettingsStore for FileSettingsStore {
    fn get_array(&self, key: &str) -> Result<Vec<String>> {
        Ok(self.arrays.lock().get(key).cloned().unwrap_or_default())
    }

    fn add_to_array(&self, key: &str, value: &str) -> Result<()> {
        let mut arrays = self.arrays.lock();
        let values = arrays.entry(key.to_string()).or_default();
        if values.iter().any(|v| v == value) {
            return Ok(());
        }
        values.push(value.to_string());
        self.persist(&arrays)
    }

    fn remove_from_array(&self, key: &str, value: &str) -> Result<bool> {
        let mut arrays = self.arrays.lock();
        let removed = match arrays.get_mut(key) {
            Some(values) => {
                let before = values.len();
                values.retain(|v| v != value);
                values.len() != before
            }
            None => false,
        };
        if removed {
            self.persist(&arrays)?;
        }
        Ok(removed)
    }

    fn set_array(&self, key: &str, values: Vec<String>) -> Result<()> {
        let mut arrays = self.arrays.lock();
        arrays.insert(key.to_string(), values);
        self.persist(&arrays)
    }

    fn update_array(
        &self,
        key: &str,
        update: &mut dyn FnMut(&mut Vec<String>) -> bool,
    ) -> Result<()> {
        let mut arrays = self.arrays.lock();
        let mut values = arrays.get(key).cloned().unwrap_or_default();
        if !update(&mut values) {
            return Ok(());
        }
        arrays.insert(key.to_string(), values);
        self.persist(&arrays)
    }
}
