use crate::font::{DEFAULT_FONT_SIZE, MAX_FONT_SIZE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Current configuration schema version. Stored files below this version are
/// migrated on load, after a backup of the original file is written.
pub const CONFIG_VERSION: u32 = 3;

pub const CONFIG_FILE: &str = "qolbar.json";
pub const TEMP_CONFIG_FILE: &str = "qolbar.tmp.json";
pub const TIMED_BACKUP_FILE: &str = "qolbar.backup.json";
pub const INVALID_CONFIG_FILE: &str = "qolbar.invalid.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarConfig {
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
    /// Hotkey string like "Ctrl+Shift+B" toggling this bar's visibility.
    #[serde(default)]
    pub hotkey: Option<String>,
}

impl BarConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hidden: false,
            hotkey: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Files written before versioning default to the oldest known schema.
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_hi_res")]
    pub use_hi_res_icons: bool,
    /// Overrides the user icon directory. `None` resolves to `icons/` next to
    /// the configuration file.
    #[serde(default)]
    pub icon_path: Option<String>,
    #[serde(default)]
    pub opt_out_game_ui_off_hide: bool,
    #[serde(default)]
    pub opt_out_cutscene_hide: bool,
    #[serde(default)]
    pub opt_out_gpose_hide: bool,
    /// Minimum minutes between rolling backups. Zero backs up on every check.
    #[serde(default = "default_backup_interval")]
    pub backup_interval_minutes: f32,
    /// Minimum milliseconds between condition cache refreshes.
    #[serde(default = "default_condition_refresh_ms")]
    pub condition_refresh_ms: u64,
    /// When enabled the engine initialises its logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default = "default_bars")]
    pub bars: Vec<BarConfig>,
}

fn default_version() -> u32 {
    1
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

fn default_hi_res() -> bool {
    true
}

fn default_backup_interval() -> f32 {
    30.0
}

fn default_condition_refresh_ms() -> u64 {
    100
}

fn default_bars() -> Vec<BarConfig> {
    vec![BarConfig::named("Main")]
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            font_size: default_font_size(),
            use_hi_res_icons: default_hi_res(),
            icon_path: None,
            opt_out_game_ui_off_hide: false,
            opt_out_cutscene_hide: false,
            opt_out_gpose_hide: false,
            backup_interval_minutes: default_backup_interval(),
            condition_refresh_ms: default_condition_refresh_ms(),
            debug_logging: false,
            bars: default_bars(),
        }
    }
}

/// Owns the persisted configuration: loading, migration, versioned and timed
/// backups, and the separate primary/scratch save targets.
pub struct ConfigStore {
    pub config: Configuration,
    dir: PathBuf,
    stored_version: u32,
    stored_raw: Option<String>,
    version_backup_done: bool,
    /// Unix seconds of the last rolling backup. Starts at load time so a
    /// fresh session waits a full interval before its first backup.
    last_timed_backup: i64,
    update_notice: bool,
}

impl ConfigStore {
    /// Deserialize the configuration from `dir`, or default-construct when
    /// the file is missing or empty. A file that fails to parse is preserved
    /// aside and replaced by defaults rather than aborting the plugin.
    pub fn load(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let path = dir.join(CONFIG_FILE);
        let raw = fs::read_to_string(&path).unwrap_or_default();
        let (config, stored_raw) = if raw.trim().is_empty() {
            (Configuration::default(), None)
        } else {
            match serde_json::from_str::<Configuration>(&raw) {
                Ok(config) => (config, Some(raw)),
                Err(e) => {
                    tracing::error!("configuration file is corrupt, using defaults: {e}");
                    let quarantine = dir.join(INVALID_CONFIG_FILE);
                    if let Err(e) = fs::write(&quarantine, &raw) {
                        tracing::warn!("failed to preserve corrupt configuration: {e}");
                    }
                    (Configuration::default(), None)
                }
            }
        };
        let stored_version = config.version;
        Self {
            config,
            dir,
            stored_version,
            stored_raw,
            version_backup_done: false,
            last_timed_backup: chrono::Utc::now().timestamp(),
            update_notice: false,
        }
    }

    pub fn default_dir() -> PathBuf {
        dirs_next::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("qolbar")
    }

    /// Normalize absent or degenerate fields in memory. Idempotent.
    pub fn initialize(&mut self) {
        let config = &mut self.config;
        if !config.font_size.is_finite() || config.font_size < 1.0 {
            config.font_size = default_font_size();
        }
        if config.backup_interval_minutes < 0.0 {
            config.backup_interval_minutes = default_backup_interval();
        }
        if config.condition_refresh_ms == 0 {
            config.condition_refresh_ms = default_condition_refresh_ms();
        }
        if config.bars.is_empty() {
            config.bars = default_bars();
        }
    }

    /// Apply ordered migration steps from the stored version up to
    /// [`CONFIG_VERSION`]. Every step is pure and idempotent when re-applied
    /// to already-migrated data, so a crash between migration and save is
    /// recoverable by simply running it again.
    pub fn update_version(&mut self) {
        let from = self.config.version;
        while self.config.version < CONFIG_VERSION {
            match self.config.version {
                1 => migrate_v1_to_v2(&mut self.config),
                2 => migrate_v2_to_v3(&mut self.config),
                _ => {}
            }
            self.config.version += 1;
        }
        if from < CONFIG_VERSION {
            self.update_notice = true;
        }
    }

    /// Write a copy of the pre-migration file tagged with the previous
    /// version. Only happens once per version transition; no-op when the
    /// stored file was already current.
    pub fn try_backup(&mut self) -> anyhow::Result<()> {
        if self.version_backup_done || self.stored_version >= CONFIG_VERSION {
            return Ok(());
        }
        let Some(raw) = &self.stored_raw else {
            return Ok(());
        };
        let path = self.dir.join(format!("qolbar.v{}.json", self.stored_version));
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, raw)?;
            tracing::info!(
                "backed up version {} configuration to {}",
                self.stored_version,
                path.display()
            );
        }
        self.version_backup_done = true;
        Ok(())
    }

    /// Write a rolling backup no more often than the configured interval.
    /// Failures are logged, never propagated.
    pub fn do_timed_backup(&mut self) {
        let interval_secs = (self.config.backup_interval_minutes.max(0.0) * 60.0) as i64;
        let now = chrono::Utc::now().timestamp();
        if now - self.last_timed_backup < interval_secs {
            return;
        }
        self.last_timed_backup = now;
        if let Err(e) = self.write_config(&self.dir.join(TIMED_BACKUP_FILE)) {
            tracing::warn!("timed backup failed: {e:#}");
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.write_config(&self.dir.join(CONFIG_FILE))
    }

    /// Persist scratch state separately so an in-progress edit session can be
    /// abandoned without corrupting the committed configuration.
    pub fn save_temp_config(&self) -> anyhow::Result<()> {
        self.write_config(&self.dir.join(TEMP_CONFIG_FILE))
    }

    fn write_config(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.config)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Re-read the committed configuration from disk, discarding in-memory
    /// state.
    pub fn reload(&mut self) {
        let dir = self.dir.clone();
        *self = ConfigStore::load(dir);
    }

    pub fn icon_directory(&self) -> PathBuf {
        match self.config.icon_path.as_deref() {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => self.dir.join("icons"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn stored_version(&self) -> u32 {
        self.stored_version
    }

    pub fn update_notice_pending(&self) -> bool {
        self.update_notice
    }

    pub fn acknowledge_update_notice(&mut self) {
        self.update_notice = false;
    }
}

fn migrate_v1_to_v2(config: &mut Configuration) {
    if !config.font_size.is_finite() || config.font_size < 1.0 {
        config.font_size = default_font_size();
    }
    if config.font_size > MAX_FONT_SIZE {
        config.font_size = MAX_FONT_SIZE;
    }
}

fn migrate_v2_to_v3(config: &mut Configuration) {
    if config
        .icon_path
        .as_deref()
        .is_some_and(|p| p.trim().is_empty())
    {
        config.icon_path = None;
    }
    for (idx, bar) in config.bars.iter_mut().enumerate() {
        if bar.name.trim().is_empty() {
            bar.name = format!("Bar {}", idx + 1);
        }
    }
}
