use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerSettings {
    // Rows per page for panels the user has not re-paged
    pub default_page_size: usize,
    // Upper bound on memoized filter/facet results
    pub filter_cache_capacity: usize,
    // How long a breadcrumb-segment highlight stays visible
    pub highlight_duration_ms: u64,
    // Quiet period before a state change is handed to the host
    pub checkpoint_debounce_ms: u64,
    // Keep expansions whose source row survives a root key-set change
    pub preserve_expansions_on_resync: bool,
    // If None, use OS default autosave directory
    pub autosave_override: Option<PathBuf>,
    // If None, use OS temporary directory for exports
    pub export_override: Option<PathBuf>,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            filter_cache_capacity: 64,
            highlight_duration_ms: 2000,
            checkpoint_debounce_ms: 500,
            preserve_expansions_on_resync: false,
            autosave_override: None,
            export_override: None,
        }
    }
}

const APP_DIR: &str = "graph-explorer";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Copy, Clone)]
enum UserDir {
    Config,
    State,
}

fn env_dir(var: &str) -> Option<PathBuf> {
    std::env::var_os(var).filter(|v| !v.is_empty()).map(PathBuf::from)
}

// Per-user base directory for `kind`, before the app folder is appended.
fn user_base(kind: UserDir) -> Option<PathBuf> {
    let home = env_dir("HOME");
    if cfg!(target_os = "windows") {
        return match kind {
            UserDir::Config => env_dir("APPDATA"),
            UserDir::State => env_dir("LOCALAPPDATA"),
        };
    }
    if cfg!(target_os = "macos") {
        return home.map(|h| h.join("Library").join("Application Support"));
    }
    match kind {
        UserDir::Config => env_dir("XDG_CONFIG_HOME").or_else(|| home.map(|h| h.join(".config"))),
        UserDir::State => env_dir("XDG_STATE_HOME").or_else(|| home.map(|h| h.join(".local").join("state"))),
    }
}

impl ExplorerSettings {
    fn settings_path() -> PathBuf {
        user_base(UserDir::Config)
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR)
            .join(SETTINGS_FILE)
    }

    /// Settings from the per-user config dir; a missing file means defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::settings_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&text)?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::settings_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Where checkpoints go: the override, else the per-user state dir (Checkpoints under it on Windows).
    pub fn autosave_dir(&self) -> PathBuf {
        if let Some(p) = &self.autosave_override {
            return p.clone();
        }
        match user_base(UserDir::State) {
            Some(base) if cfg!(target_os = "windows") => base.join(APP_DIR).join("Checkpoints"),
            Some(base) => base.join(APP_DIR),
            None => std::env::temp_dir().join(APP_DIR),
        }
    }

    pub fn export_dir(&self) -> PathBuf {
        match &self.export_override {
            Some(p) => p.clone(),
            None => std::env::temp_dir().join(APP_DIR).join("exports"),
        }
    }
}
