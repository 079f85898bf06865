use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;

/// One recorded expense.
///
/// `id` is assigned by the store on insert and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub id: i64,
    pub category: String,
    pub price: i64,
}

/// An expense that has not been stored yet (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub category: String,
    pub price: i64,
}

impl NewEntry {
    pub fn new(category: impl Into<String>, price: i64) -> Self {
        Self {
            category: category.into(),
            price,
        }
    }
}

/// Per-category aggregate, recomputed from the items table on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub category: String,
    pub count: i64,
    pub sum: i64,
}

impl Summary {
    /// Average price in the group, `0.0` for an empty group.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum as f64 / self.count as f64
    }
}

/// Data access for the expense table.
///
/// Wraps a single SQLite connection. All reads return owned copies; the
/// statement (and its cursor) is dropped before each method returns, on the
/// error path as well.
pub struct AccountBook {
    conn: Connection,
}

impl AccountBook {
    /// Wrap an already-open connection
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened account book database");
        Ok(Self::new(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    /// Create the items table if it does not exist yet.
    ///
    /// Safe to call on every startup. A failure here means the connection is
    /// unusable and should abort initialisation.
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS items (
                id       INTEGER PRIMARY KEY,
                category TEXT NOT NULL,
                price    INTEGER NOT NULL
            )",
            [],
        )?;

        debug!("items table ready");
        Ok(())
    }

    /// Insert one entry and return the id the database assigned to it
    pub fn add_entry(&self, category: &str, price: i64) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO items (category, price) VALUES (?1, ?2)",
            params![category, price],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(id, category, price, "entry added");
        Ok(id)
    }

    /// Insert entries one statement at a time, stopping at the first failure.
    pub fn add_entries(&self, entries: &[NewEntry]) -> Result<usize> {
        let mut inserted = 0;

        for entry in entries {
            self.add_entry(&entry.category, entry.price)?;
            inserted += 1;
        }

        info!(inserted, "entries added");
        Ok(inserted)
    }

    /// Up to `limit` entries, most recently inserted first.
    ///
    /// Ordering is by id, which follows insertion order; there is no
    /// timestamp column. A limit of zero yields an empty list without
    /// querying.
    pub fn list_recent(&self, limit: usize) -> Result<Vec<Entry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            "SELECT id, category, price
             FROM items
             ORDER BY id DESC
             LIMIT ?1",
        )?;

        let entries = stmt
            .query_map([limit], |row| {
                Ok(Entry {
                    id: row.get(0)?,
                    category: row.get(1)?,
                    price: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Count, sum and average inputs per category, ordered by category name
    pub fn list_summaries(&self) -> Result<Vec<Summary>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, COUNT(*), SUM(price)
             FROM items
             GROUP BY category
             ORDER BY category",
        )?;

        let summaries = stmt
            .query_map([], |row| {
                Ok(Summary {
                    category: row.get(0)?,
                    count: row.get(1)?,
                    sum: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(summaries)
    }

    pub fn count_entries(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;

        Ok(count)
    }
}
