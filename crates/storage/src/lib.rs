use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

/// An `events` row exactly as stored.
///
/// Rows are written by administrative tooling, so `date` is kept as raw
/// text; readers decide what to do with values that do not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvent {
    pub event_id: String,
    pub name: String,
    pub description: String,
    pub date: String,
}

#[derive(Debug, Clone)]
pub struct NewEvent<'a> {
    pub event_id: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub date: NaiveDate,
}

impl Storage {
    /// Opens the database, creating it when missing, and applies migrations.
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Builds a pool that does not connect until first use.
    ///
    /// Only a malformed URL fails here. Connection errors surface on each
    /// query instead, so a database that comes back later is picked up by the
    /// next call without rebuilding the handle.
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url '{database_url}'"))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_lazy_with(connect_options);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn upsert_event(&self, event: &NewEvent<'_>) -> Result<()> {
        sqlx::query(
            "INSERT INTO events (id, name, description, date) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                date = excluded.date,
                updated_at = CURRENT_TIMESTAMP",
        )
        .bind(event.event_id)
        .bind(event.name)
        .bind(event.description)
        .bind(event.date.format("%Y-%m-%d").to_string())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to upsert event '{}'", event.event_id))?;
        Ok(())
    }

    pub async fn remove_event(&self, event_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?1")
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Lists every event by date, then by insertion order.
    pub async fn list_events(&self) -> Result<Vec<StoredEvent>> {
        let rows = sqlx::query(
            "SELECT id, name, description, date FROM events ORDER BY date ASC, seq ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list events")?;

        rows.into_iter()
            .map(|row| -> Result<StoredEvent> {
                Ok(StoredEvent {
                    event_id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    description: row.try_get("description")?,
                    date: row.try_get("date")?,
                })
            })
            .collect()
    }

    pub async fn count_events(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
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
#[path = "tests/lib_tests.rs"]
mod tests;
