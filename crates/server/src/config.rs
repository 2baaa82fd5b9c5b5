use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:3000".into(),
            database_url: "sqlite://./data/todos.db".into(),
            max_body_bytes: 64 * 1024,
        }
    }
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    settings_from_sources(file.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then `server.toml` keys, then environment variables. Later
/// sources win; unparsable values are ignored.
pub fn settings_from_sources(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file_contents {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) {
            if let Some(v) = file_cfg.get("bind_addr").and_then(toml::Value::as_str) {
                settings.server_bind = v.to_string();
            }
            if let Some(v) = file_cfg.get("database_url").and_then(toml::Value::as_str) {
                settings.database_url = v.to_string();
            }
            if let Some(v) = file_cfg
                .get("max_body_bytes")
                .and_then(toml::Value::as_integer)
                .and_then(|v| usize::try_from(v).ok())
            {
                settings.max_body_bytes = v;
            }
        }
    }

    for key in ["SERVER_BIND", "APP__BIND_ADDR"] {
        if let Some(v) = env(key) {
            settings.server_bind = v;
        }
    }

    for key in ["DATABASE_URL", "APP__DATABASE_URL"] {
        if let Some(v) = env(key) {
            settings.database_url = v;
        }
    }

    if let Some(v) = env("APP__MAX_BODY_BYTES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_body_bytes = parsed;
        }
    }

    settings
}

pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    ensure_parent_dir_exists(&database_url)?;
    Ok(database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") {
        return raw_database_url.to_string();
    }

    let path = if let Some(path) = raw_database_url.strip_prefix("sqlite://") {
        path
    } else if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        path
    } else if raw_database_url.contains("://") {
        return raw_database_url.to_string();
    } else {
        raw_database_url
    };

    let path = path.replace('\\', "/");
    if has_windows_drive_prefix(&path) {
        format!("sqlite:{path}")
    } else {
        format!("sqlite://{path}")
    }
}

fn has_windows_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}

fn ensure_parent_dir_exists(database_url: &str) -> anyhow::Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
