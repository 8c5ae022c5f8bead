use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const PREFS_DIR: &str = "fctracker_terminal";
const PREFS_FILE: &str = "preferences.json";
pub const DARK_MODE_KEY: &str = "darkMode";

/// String key/value store persisted as one JSON object, like browser local storage.
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl Preferences {
    /// A missing or unreadable file yields an empty store.
    pub fn load(path: Option<PathBuf>) -> Self {
        let path = path.or_else(default_path);
        let values = path
            .as_deref()
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|raw| serde_json::from_str::<BTreeMap<String, String>>(&raw).ok())
            .unwrap_or_default();
        Self { path, values }
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.values.insert(key.to_string(), value.into());
        self.save()
    }

    pub fn dark_mode(&self) -> bool {
        self.get(DARK_MODE_KEY) == Some("true")
    }

    pub fn set_dark_mode(&mut self, enabled: bool) -> Result<()> {
        self.set(DARK_MODE_KEY, if enabled { "true" } else { "false" })
    }

    fn save(&self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(&self.values).context("serialize preferences")?;
        fs::write(&tmp, json).context("write preferences")?;
        fs::rename(&tmp, path).context("swap preferences")?;
        Ok(())
    }
}

fn default_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CONFIG_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(PREFS_DIR).join(PREFS_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".config").join(PREFS_DIR).join(PREFS_FILE))
}
