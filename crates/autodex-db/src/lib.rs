// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use autodex_app::Theme;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

pub const APP_NAME: &str = "autodex";
pub const THEME_KEY: &str = "theme";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS settings (
  key TEXT PRIMARY KEY,
  value TEXT NOT NULL,
  updated_at TEXT NOT NULL
);
";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[("settings", &["key", "value", "updated_at"])];

/// Preference storage. The catalog itself is never persisted; only small
/// key/value settings live here.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create database directory {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        debug!(path = %path.display(), "opened preference store");
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn.execute_batch(SCHEMA).context("create schema")?;
            info!("created preference schema");
        }
        Ok(())
    }

    /// The saved theme, or dark when nothing has been saved yet.
    pub fn get_theme(&self) -> Result<Theme> {
        match self.get_setting_raw(THEME_KEY)? {
            Some(raw) => Theme::parse(&raw).ok_or_else(|| {
                anyhow!(
                    "setting `{THEME_KEY}` has invalid value `{raw}`; expected dark or light, toggle the theme to overwrite it"
                )
            }),
            None => Ok(Theme::default()),
        }
    }

    pub fn put_theme(&self, theme: Theme) -> Result<()> {
        self.put_setting_raw(THEME_KEY, theme.as_str())
    }

    pub fn setting_updated_at(&self, key: &str) -> Result<Option<OffsetDateTime>> {
        let raw = self
            .conn
            .query_row(
                "SELECT updated_at FROM settings WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("read timestamp of setting {key}"))?;
        raw.map(|value| {
            OffsetDateTime::parse(&value, &Rfc3339)
                .with_context(|| format!("parse timestamp {value:?} of setting {key}"))
        })
        .transpose()
    }

    fn get_setting_raw(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("read setting {key}"))
    }

    fn put_setting_raw(&self, key: &str, value: &str) -> Result<()> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO settings (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                ",
                params![key, value, now],
            )
            .with_context(|| format!("upsert setting {key}"))?;
        debug!(key, value, "saved setting");
        Ok(())
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("AUTODEX_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }
    Ok(app_data_dir()?.join("autodex.db"))
}

pub fn default_log_path() -> Result<PathBuf> {
    Ok(app_data_dir()?.join("autodex.log"))
}

fn app_data_dir() -> Result<PathBuf> {
    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set AUTODEX_DB_PATH to a writable database path")
    })?;
    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir)
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        let columns = table_columns(conn, table)?;
        if columns.is_empty() {
            bail!(
                "database is missing required table `{table}`; point [storage].db_path at an autodex database or a new file"
            );
        }

        let missing = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; remove the database file to reset preferences",
                missing.join(", ")
            );
        }
    }
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}
