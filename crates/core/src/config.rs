//! Store configuration.
//!
//! The configuration directory is an explicit value handed to the
//! layout-mode store rather than a process-wide constant.

use std::path::{Path, PathBuf};

/// Name of the configuration directory under the user's home.
pub const CONFIG_DIR_NAME: &str = ".slidefill";

/// File holding the persisted layout modes.
pub const MODES_FILE_NAME: &str = "custom_modes.json";

/// Template looked up next to the executable when a mode's template is gone.
pub const DEFAULT_TEMPLATE_FILE: &str = "templates/Templates.pptx";

/// Where layout modes are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    config_dir: PathBuf,
}

impl StoreConfig {
    /// Use an explicit configuration directory.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// `~/.slidefill`, or `./.slidefill` when the home directory is unknown.
    pub fn default_location() -> Self {
        let base = dirs::home_dir().unwrap_or_else(|| {
            log::warn!("Could not determine home directory, using current directory");
            PathBuf::from(".")
        });
        Self::new(base.join(CONFIG_DIR_NAME))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Full path of the modes file.
    pub fn modes_file(&self) -> PathBuf {
        self.config_dir.join(MODES_FILE_NAME)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::default_location()
    }
}

/// The bundled template next to the running executable, if present.
pub fn default_template() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let candidate = exe.parent()?.join(DEFAULT_TEMPLATE_FILE);
    candidate.exists().then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes_file_path() {
        let config = StoreConfig::new("/tmp/cfg");
        assert_eq!(config.modes_file(), PathBuf::from("/tmp/cfg/custom_modes.json"));
        assert_eq!(config.config_dir(), Path::new("/tmp/cfg"));
    }

    #[test]
    fn test_default_location_ends_with_dir_name() {
        let config = StoreConfig::default_location();
        assert!(config.config_dir().ends_with(CONFIG_DIR_NAME));
    }
}
