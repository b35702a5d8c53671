//! In-memory settings store.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::Result;
use crate::settings::SettingsStore;

/// Settings kept in process memory, mainly for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    arrays: RwLock<HashMap<String, Vec<String>>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_array(&self, key: &str) -> Result<Vec<String>> {
        Ok(self.arrays.read().get(key).cloned().unwrap_or_default())
    }

    fn add_to_array(&self, key: &str, value: &str) -> Result<()> {
        let mut arrays = self.arrays.write();
        let values = arrays.entry(key.to_string()).or_default();
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
        Ok(())
    }

    fn remove_from_array(&self, key: &str, value: &str) -> Result<bool> {
        let mut arrays = self.arrays.write();
        let Some(values) = arrays.get_mut(key) else {
            return Ok(false);
        };
        let before = values.len();
        values.retain(|v| v != value);
        Ok(values.len() != before)
    }

    fn set_array(&self, key: &str, values: Vec<String>) -> Result<()> {
        self.arrays.write().insert(key.to_string(), values);
        Ok(())
    }

    fn update_array(
        &self,
        key: &str,
        update: &mut dyn FnMut(&mut Vec<String>) -> bool,
    ) -> Result<()> {
        let mut arrays = self.arrays.write();
        let mut values = arrays.get(key).cloned().unwrap_or_default();
        if update(&mut values) {
            arrays.insert(key.to_string(), values);
        }
        Ok(())
    }
}
