//! Persisted layout modes.
//!
//! Modes are stored as one JSON object keyed by mode name. Records written
//! by older versions may lack `template_file`, `slide_index` or
//! `text_layouts`; those default to `null`, `0` and `[]`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::types::{LayoutMode, CUSTOM_MODE};

/// In-memory layout modes synchronized with the modes file.
#[derive(Debug, Clone)]
pub struct LayoutModeStore {
    config: StoreConfig,
    modes: BTreeMap<String, LayoutMode>,
}

impl LayoutModeStore {
    /// Load modes from the configured file.
    ///
    /// A missing file yields only the reserved mode. An unreadable or
    /// malformed file is reported and replaced by the defaults.
    pub fn open(config: StoreConfig) -> Self {
        let path = config.modes_file();
        let modes = if path.exists() {
            match read_modes(&path) {
                Ok(modes) => modes,
                Err(e) => {
                    log::warn!("Resetting layout modes from {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        let mut store = Self { config, modes };
        store.ensure_custom();
        store
    }

    /// The configuration this store was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Write all modes to the configured file, creating its directory.
    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(self.config.config_dir())?;
        let json = serde_json::to_string_pretty(&self.modes)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        fs::write(self.config.modes_file(), json)?;
        log::debug!(
            "Saved {} layout modes to {}",
            self.modes.len(),
            self.config.modes_file().display()
        );
        Ok(())
    }

    /// Look up a mode by name.
    pub fn get(&self, name: &str) -> Option<&LayoutMode> {
        self.modes.get(name)
    }

    /// Look up a mode, failing when it does not exist.
    pub fn require(&self, name: &str) -> Result<&LayoutMode> {
        self.get(name)
            .ok_or_else(|| Error::ModeNotFound(name.to_string()))
    }

    /// Mode names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.modes.keys().map(String::as_str).collect()
    }

    /// All modes in name order.
    pub fn modes(&self) -> impl Iterator<Item = &LayoutMode> {
        self.modes.values()
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Insert or replace a mode. The reserved mode cannot be overwritten.
    pub fn upsert(&mut self, mode: LayoutMode) -> Result<()> {
        if mode.name == CUSTOM_MODE {
            return Err(Error::ReservedMode(mode.name));
        }
        mode.validate()?;
        self.modes.insert(mode.name.clone(), mode);
        Ok(())
    }

    /// Remove a mode by name. The reserved mode cannot be deleted.
    pub fn delete(&mut self, name: &str) -> Result<LayoutMode> {
        if name == CUSTOM_MODE {
            return Err(Error::ReservedMode(name.to_string()));
        }
        self.modes
            .remove(name)
            .ok_or_else(|| Error::ModeNotFound(name.to_string()))
    }

    fn ensure_custom(&mut self) {
        self.modes
            .entry(CUSTOM_MODE.to_string())
            .or_insert_with(LayoutMode::custom);
    }
}

/// Parse a modes file strictly.
pub fn read_modes(path: &Path) -> Result<BTreeMap<String, LayoutMode>> {
    let content = fs::read_to_string(path)?;
    parse_modes(&content)
}

/// Parse the JSON mapping of mode name to record.
pub fn parse_modes(json: &str) -> Result<BTreeMap<String, LayoutMode>> {
    let mut modes: BTreeMap<String, LayoutMode> =
        serde_json::from_str(json).map_err(|e| Error::ConfigError(e.to_string()))?;
    for (name, mode) in modes.iter_mut() {
        mode.name = name.clone();
    }
    Ok(modes)
}
