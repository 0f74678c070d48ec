//! SQLite-backed key/value preferences.
//!
//! Values are stored as JSON text. Each write replaces the whole value for its
//! key in a single statement.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub struct Preferences {
    conn: Connection,
}

impl Preferences {
    /// Open or create the preferences database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create preferences directory")?;
        }

        let conn = Connection::open(path).context("Failed to open preferences database")?;
        let prefs = Self { conn };
        prefs.init_schema()?;
        Ok(prefs)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let prefs = Self { conn };
        prefs.init_schema()?;
        Ok(prefs)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS preferences (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .context("Failed to initialize preferences schema")?;
        Ok(())
    }

    /// Raw stored text for `key`.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to read preference")
    }

    pub fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO preferences (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .context("Failed to write preference")?;
        Ok(())
    }

    /// Read a string list. `Ok(None)` when the key is absent; an error when
    /// the stored value is not a JSON array of strings.
    pub fn get_string_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.get_raw(key)? {
            Some(json) => {
                let list = serde_json::from_str(&json)
                    .with_context(|| format!("Preference '{}' is not a string list", key))?;
                Ok(Some(list))
            }
            None => Ok(None),
        }
    }

    pub fn set_string_list(&self, key: &str, values: &[String]) -> Result<()> {
        let json = serde_json::to_string(values).context("Failed to serialize string list")?;
        self.set_raw(key, &json)
    }
}
