use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    pub server_public_url: Option<String>,
    pub assistant_upstream_url: Option<String>,
    pub assistant_timeout_ms: u64,
    pub primary_timeout_ms: u64,
    pub meeting_join_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:5001".into(),
            database_url: "sqlite://./data/festival_hub.db".into(),
            server_public_url: None,
            assistant_upstream_url: None,
            assistant_timeout_ms: 3_000,
            primary_timeout_ms: 2_000,
            meeting_join_url: catalog::meeting::DEFAULT_JOIN_URL.into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

pub(crate) fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        return;
    };

    if let Some(v) = file_cfg.get("bind_addr") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = file_cfg.get("database_url") {
        settings.database_url = v.clone();
    }
    if let Some(v) = file_cfg.get("server_public_url") {
        settings.server_public_url = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("assistant_upstream_url") {
        settings.assistant_upstream_url = non_empty(v);
    }
    if let Some(v) = file_cfg.get("meeting_join_url") {
        settings.meeting_join_url = v.clone();
    }
    if let Some(v) = file_cfg.get("assistant_timeout_ms").and_then(|v| v.parse().ok()) {
        settings.assistant_timeout_ms = v;
    }
    if let Some(v) = file_cfg.get("primary_timeout_ms").and_then(|v| v.parse().ok()) {
        settings.primary_timeout_ms = v;
    }
}

pub(crate) fn apply_env(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("SERVER_PUBLIC_URL") {
        settings.server_public_url = Some(v);
    }

    if let Some(v) = env("ASSISTANT_UPSTREAM_URL") {
        settings.assistant_upstream_url = non_empty(&v);
    }
    if let Some(v) = env("APP__ASSISTANT_UPSTREAM_URL") {
        settings.assistant_upstream_url = non_empty(&v);
    }

    if let Some(v) = env("APP__MEETING_JOIN_URL") {
        settings.meeting_join_url = v;
    }

    if let Some(v) = env("APP__ASSISTANT_TIMEOUT_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.assistant_timeout_ms = parsed;
        }
    }
    if let Some(v) = env("APP__PRIMARY_TIMEOUT_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.primary_timeout_ms = parsed;
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
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

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
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
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
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
