//! Durable item store backed by redb.
//!
//! # Table design
//!
//! ```text
//! items         (prefix, sequence)  -> JSON-encoded InventoryItem
//! codes_by_seq  (sequence, prefix)  -> code as written
//! ```
//!
//! A code's identity is its prefix and sequence; padding is not part of
//! either key, so `ALM-5` and `ALM-0005` collide. `codes_by_seq` orders by
//! sequence and then prefix, the same order as `Code`, so the highest issued
//! code is the table's last entry. Both tables are written in the same
//! transaction; redb serializes write transactions, which makes the
//! existence check in `insert_item` a real uniqueness constraint.
//!
//! redb is blocking, so every call runs on `spawn_blocking`.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};

use crate::code::Code;
use crate::error::{AlmoxError, Result};
use crate::item::InventoryItem;
use crate::store::{CodeStore, ItemStore};

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

const ITEMS: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("items");
const CODES_BY_SEQ: TableDefinition<(u64, &str), &str> = TableDefinition::new("codes_by_seq");

fn unavailable(e: impl std::fmt::Display) -> AlmoxError {
    AlmoxError::StoreUnavailable(e.to_string())
}

// ---------------------------------------------------------------------------
// ItemDb
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ItemDb {
    db: Arc<Database>,
}

impl ItemDb {
    /// Open or create the database at `path`, creating both tables.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path).map_err(unavailable)?;
        let wt = db.begin_write().map_err(unavailable)?;
        wt.open_table(ITEMS).map_err(unavailable)?;
        wt.open_table(CODES_BY_SEQ).map_err(unavailable)?;
        wt.commit().map_err(unavailable)?;
        Ok(Self { db: Arc::new(db) })
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(unavailable)?
    }
}

fn max_code(db: &Database) -> Result<Option<Code>> {
    let rt = db.begin_read().map_err(unavailable)?;
    let table = rt.open_table(CODES_BY_SEQ).map_err(unavailable)?;
    let last = match table.last().map_err(unavailable)? {
        Some((_, written)) => Some(Code::parse(written.value())?),
        None => None,
    };
    Ok(last)
}

fn contains(db: &Database, code: &Code) -> Result<bool> {
    let rt = db.begin_read().map_err(unavailable)?;
    let table = rt.open_table(ITEMS).map_err(unavailable)?;
    let found = table
        .get((code.prefix(), code.sequence()))
        .map_err(unavailable)?
        .is_some();
    Ok(found)
}

fn insert(db: &Database, item: &InventoryItem) -> Result<()> {
    let code = &item.code;
    let written = code.to_string();
    let value = serde_json::to_vec(item)?;
    let wt = db.begin_write().map_err(unavailable)?;
    {
        let mut items = wt.open_table(ITEMS).map_err(unavailable)?;
        let key = (code.prefix(), code.sequence());
        if items.get(key).map_err(unavailable)?.is_some() {
            return Err(AlmoxError::UniquenessViolation(written));
        }
        items.insert(key, value.as_slice()).map_err(unavailable)?;
        let mut by_seq = wt.open_table(CODES_BY_SEQ).map_err(unavailable)?;
        by_seq
            .insert((code.sequence(), code.prefix()), written.as_str())
            .map_err(unavailable)?;
    }
    wt.commit().map_err(unavailable)?;
    Ok(())
}

fn get(db: &Database, code: &Code) -> Result<Option<InventoryItem>> {
    let rt = db.begin_read().map_err(unavailable)?;
    let table = rt.open_table(ITEMS).map_err(unavailable)?;
    let item = match table
        .get((code.prefix(), code.sequence()))
        .map_err(unavailable)?
    {
        Some(v) => Some(serde_json::from_slice(v.value())?),
        None => None,
    };
    Ok(item)
}

fn list(db: &Database) -> Result<Vec<InventoryItem>> {
    let rt = db.begin_read().map_err(unavailable)?;
    let table = rt.open_table(ITEMS).map_err(unavailable)?;
    let mut result = Vec::new();
    for entry in table.iter().map_err(unavailable)? {
        let (_, v) = entry.map_err(unavailable)?;
        let item: InventoryItem = serde_json::from_slice(v.value())?;
        result.push(item);
    }
    result.sort_by(|a, b| a.code.cmp(&b.code));
    Ok(result)
}

#[async_trait]
impl CodeStore for ItemDb {
    async fn query_max_issued_code(&self) -> Result<Option<Code>> {
        self.blocking(max_code).await
    }

    async fn exists_code(&self, candidate: &Code) -> Result<bool> {
        let code = candidate.clone();
        self.blocking(move |db| contains(db, &code)).await
    }
}

#[async_trait]
impl ItemStore for ItemDb {
    async fn insert_item(&self, item: &InventoryItem) -> Result<()> {
        let item = item.clone();
        self.blocking(move |db| insert(db, &item)).await
    }

    async fn get_item(&self, code: &Code) -> Result<Option<InventoryItem>> {
        let code = code.clone();
        self.blocking(move |db| get(db, &code)).await
    }

    async fn list_items(&self) -> Result<Vec<InventoryItem>> {
        self.blocking(list).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
