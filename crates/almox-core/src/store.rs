//! Store interfaces and the in-memory implementation.
//!
//! `CodeStore` is the read-only view the generator consumes. `ItemStore`
//! adds the persistence side, where the uniqueness constraint on codes is
//! enforced. The generator never writes.

use crate::code::Code;
use crate::error::{AlmoxError, Result};
use crate::item::InventoryItem;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Highest issued code by sequence number, `None` when nothing was issued.
    async fn query_max_issued_code(&self) -> Result<Option<Code>>;

    /// Whether any record currently holds `candidate`.
    async fn exists_code(&self, candidate: &Code) -> Result<bool>;
}

#[async_trait]
pub trait ItemStore: CodeStore {
    /// Persist `item`. Fails with `UniquenessViolation` if its code is taken.
    async fn insert_item(&self, item: &InventoryItem) -> Result<()>;

    async fn get_item(&self, code: &Code) -> Result<Option<InventoryItem>>;

    /// All items in code order.
    async fn list_items(&self) -> Result<Vec<InventoryItem>>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Process-local store keyed by code.
///
/// Supports failure injection so callers can be tested against an
/// unreachable or slow backend.
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<BTreeMap<Code, InventoryItem>>,
    unavailable: AtomicBool,
    latency_ms: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StoreUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay every subsequent call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    async fn round_trip(&self) -> Result<()> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AlmoxError::StoreUnavailable(
                "memory store marked unavailable".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CodeStore for MemoryStore {
    async fn query_max_issued_code(&self) -> Result<Option<Code>> {
        self.round_trip().await?;
        Ok(self.items.read().await.keys().next_back().cloned())
    }

    async fn exists_code(&self, candidate: &Code) -> Result<bool> {
        self.round_trip().await?;
        Ok(self.items.read().await.contains_key(candidate))
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn insert_item(&self, item: &InventoryItem) -> Result<()> {
        self.round_trip().await?;
        let mut items = self.items.write().await;
        if items.contains_key(&item.code) {
            return Err(AlmoxError::UniquenessViolation(item.code.to_string()));
        }
        items.insert(item.code.clone(), item.clone());
        Ok(())
    }

    async fn get_item(&self, code: &Code) -> Result<Option<InventoryItem>> {
        self.round_trip().await?;
        Ok(self.items.read().await.get(code).cloned())
    }

    async fn list_items(&self) -> Result<Vec<InventoryItem>> {
        self.round_trip().await?;
        Ok(self.items.read().await.values().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
