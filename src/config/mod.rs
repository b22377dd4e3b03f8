use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Captured widget values: group label -> widget label -> simple value.
pub type SavedValues = BTreeMap<String, BTreeMap<String, Value>>;

/// One persisted tab descriptor. Unknown keys round-trip through `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabEntry {
    pub name: String,
    pub script: String,
    #[serde(default)]
    pub excluded: Vec<String>,
    #[serde(default)]
    pub saved: SavedValues,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TabEntry {
    pub fn new(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: script.into(),
            excluded: Vec::new(),
            saved: SavedValues::new(),
            extra: Map::new(),
        }
    }
}

/// The whole preferences document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prefs {
    /// Window geometry from the original host; preserved, never applied
    /// by the terminal.
    #[serde(default = "default_geometry")]
    pub geometry: [i64; 4],
    #[serde(default)]
    pub tab_index: usize,
    #[serde(default)]
    pub tab_data: Vec<TabEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_geometry() -> [i64; 4] {
    [100, 100, 800, 1000]
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            geometry: default_geometry(),
            tab_index: 0,
            tab_data: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl Prefs {
    /// Resolve the preferences file location: an explicit override, or
    /// `prefs.json` in the platform config directory.
    pub fn resolve_path(override_path: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = override_path {
            return Ok(path.to_path_buf());
        }
        let dirs = ProjectDirs::from("com", "scrib", "scrib")
            .ok_or_else(|| anyhow!("could not determine config directory"))?;
        Ok(dirs.config_dir().join("prefs.json"))
    }

    /// Load preferences, falling back to defaults when the file is missing
    /// or unreadable. A bad file never blocks startup.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<Prefs>(&text) {
                Ok(prefs) => {
                    debug!("loaded preferences from {}", path.display());
                    prefs
                }
                Err(err) => {
                    warn!("ignoring malformed preferences {}: {}", path.display(), err);
                    Prefs::default()
                }
            },
            Err(err) => {
                debug!("no preferences at {} ({}), using defaults", path.display(), err);
                Prefs::default()
            }
        }
    }

    /// Write preferences as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self).context("serializing preferences")?;
        fs::write(path, text)
            .with_context(|| format!("writing preferences to {}", path.display()))?;
        debug!("saved preferences to {}", path.display());
        Ok(())
    }

    /// Add a tab descriptor; tab names stay unique.
    pub fn add_tab(&mut self, name: &str, script: &str) -> Result<()> {
        if self.tab_data.iter().any(|t| t.name == name) {
            return Err(anyhow!("a tab named \"{name}\" already exists"));
        }
        self.tab_data.push(TabEntry::new(name, script));
        Ok(())
    }

    /// Remove a tab descriptor by name.
    pub fn remove_tab(&mut self, name: &str) -> bool {
        let before = self.tab_data.len();
        self.tab_data.retain(|t| t.name != name);
        if self.tab_index >= self.tab_data.len() && !self.tab_data.is_empty() {
            self.tab_index = self.tab_data.len() - 1;
        }
        self.tab_data.len() != before
    }
}
