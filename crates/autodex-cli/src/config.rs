// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use autodex_app::ViewKind;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_BASE_URL: &str = "http://localhost:8000/web_data";
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data: Data::default(),
            storage: Storage::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Data {
    pub base_url: Option<String>,
    pub data_dir: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            data_dir: None,
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub default_view: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            default_view: Some(ViewKind::Tree.as_str().to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub path: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            path: None,
        }
    }
}

/// Where the catalog is read from once config and command-line overrides are
/// combined. A data directory wins over a base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataLocation {
    Url(String),
    Directory(PathBuf),
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("AUTODEX_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set AUTODEX_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(autodex_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [data], [storage], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(db_path) = &self.storage.db_path {
            autodex_db::validate_db_path(db_path)
                .with_context(|| format!("storage.db_path in {}", path.display()))?;
        }

        if let Some(base_url) = &self.data.base_url
            && base_url.trim().is_empty()
        {
            bail!("data.base_url in {} must not be empty", path.display());
        }

        if let Some(data_dir) = &self.data.data_dir
            && data_dir.trim().is_empty()
        {
            bail!("data.data_dir in {} must not be empty", path.display());
        }

        if let Some(timeout) = &self.data.timeout {
            let parsed = parse_duration(timeout)
                .with_context(|| format!("data.timeout in {}", path.display()))?;
            if parsed <= Duration::ZERO {
                bail!(
                    "data.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(view) = &self.ui.default_view
            && ViewKind::parse(view).is_none()
        {
            bail!(
                "ui.default_view in {} must be one of grid, table, tree; got {view:?}",
                path.display()
            );
        }

        if let Some(level) = &self.log.level
            && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
        {
            bail!(
                "log.level in {} must be one of {}; got {level:?}",
                path.display(),
                LOG_LEVELS.join(", ")
            );
        }

        Ok(())
    }

    pub fn data_location(&self) -> DataLocation {
        match &self.data.data_dir {
            Some(dir) => DataLocation::Directory(PathBuf::from(dir)),
            None => DataLocation::Url(
                self.data
                    .base_url
                    .as_deref()
                    .unwrap_or(DEFAULT_BASE_URL)
                    .trim_end_matches('/')
                    .to_owned(),
            ),
        }
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.data.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => autodex_db::default_db_path(),
        }
    }

    pub fn default_view(&self) -> ViewKind {
        self.ui
            .default_view
            .as_deref()
            .and_then(ViewKind::parse)
            .unwrap_or(ViewKind::Tree)
    }

    pub fn log_level(&self) -> String {
        self.log
            .level
            .as_deref()
            .unwrap_or(DEFAULT_LOG_LEVEL)
            .to_ascii_lowercase()
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.log.path {
            Some(path) => Ok(PathBuf::from(path)),
            None => autodex_db::default_log_path(),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# autodex config\n# Place this file at: {}\n\nversion = 1\n\n[data]\n# Catalog server root serving index.json and details/<make>.json\nbase_url = \"{}\"\n# Optional. A local export with the same layout; wins over base_url\n# data_dir = \"/absolute/path/to/web_data\"\ntimeout = \"{}\"\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/autodex/autodex.db)\n# db_path = \"/absolute/path/to/autodex.db\"\n\n[ui]\n# grid, table, or tree\ndefault_view = \"tree\"\n\n[log]\nlevel = \"{}\"\n# Optional. Default is platform data dir (for example ~/.local/share/autodex/autodex.log)\n# path = \"/absolute/path/to/autodex.log\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_TIMEOUT,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
