use crate::code::Code;
use crate::error::{AlmoxError, Result};
use crate::generator::{bounded, CodeGenerator};
use crate::store::ItemStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub code: Code,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub quantity: u64,
    pub created_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn new(code: Code, draft: NewItem) -> Self {
        Self {
            id: Uuid::new_v4(),
            code,
            name: draft.name,
            unit: draft.unit,
            quantity: draft.quantity,
            created_at: Utc::now(),
        }
    }
}

/// An item that has not been assigned a code yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub unit: Option<String>,
    pub quantity: u64,
}

impl NewItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: None,
            quantity: 0,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AlmoxError::InvalidArgument("item name must not be empty".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Assign the next code to `draft` and persist it.
///
/// When another writer persists the proposed code first, the store rejects
/// the write and a fresh proposal is requested, up to `max_attempts` times.
/// Store failures are returned immediately.
pub async fn register_item(
    generator: &CodeGenerator,
    store: &dyn ItemStore,
    draft: NewItem,
    max_attempts: u32,
) -> Result<InventoryItem> {
    draft.validate()?;
    if max_attempts == 0 {
        return Err(AlmoxError::InvalidArgument(
            "max_attempts must be at least 1".into(),
        ));
    }

    let mut attempt = 0;
    loop {
        attempt += 1;
        let code = generator.next_sequential_code().await?;
        let item = InventoryItem::new(code, draft.clone());
        let timeout = generator.settings().store_timeout;
        match bounded(timeout, "insert_item", store.insert_item(&item)).await {
            Ok(()) => {
                debug!(code = %item.code, attempt, "registered item");
                return Ok(item);
            }
            Err(AlmoxError::UniquenessViolation(code)) if attempt < max_attempts => {
                warn!(%code, attempt, "code taken by a concurrent writer, retrying");
            }
            Err(e) => return Err(e),
        }
    }
}

/// Persist `draft` under a caller-chosen code. No retry on conflict.
pub async fn register_item_with_code(
    store: &dyn ItemStore,
    draft: NewItem,
    code: Code,
    timeout: Duration,
) -> Result<InventoryItem> {
    draft.validate()?;
    let item = InventoryItem::new(code, draft);
    bounded(timeout, "insert_item", store.insert_item(&item)).await?;
    Ok(item)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::CodeFormat;
    use crate::generator::GeneratorSettings;
    use crate::store::{CodeStore, MemoryStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn generator_over(store: Arc<dyn CodeStore>) -> CodeGenerator {
        CodeGenerator::new(store, CodeFormat::default(), GeneratorSettings::default())
    }

    const TIMEOUT: Duration = Duration::from_secs(5);

    /// Simulates a concurrent writer: the first `races` inserts find their
    /// code already persisted by someone else. With `stall_inserts`, writes
    /// hang while reads still answer.
    struct RacingStore {
        inner: MemoryStore,
        races: AtomicU32,
        stall_inserts: bool,
    }

    impl RacingStore {
        fn new(races: u32) -> Self {
            Self {
                inner: MemoryStore::new(),
                races: AtomicU32::new(races),
                stall_inserts: false,
            }
        }
    }

    #[async_trait]
    impl CodeStore for RacingStore {
        async fn query_max_issued_code(&self) -> Result<Option<Code>> {
            self.inner.query_max_issued_code().await
        }

        async fn exists_code(&self, candidate: &Code) -> Result<bool> {
            self.inner.exists_code(candidate).await
        }
    }

    #[async_trait]
    impl ItemStore for RacingStore {
        async fn insert_item(&self, item: &InventoryItem) -> Result<()> {
            if self.stall_inserts {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            if self.races.load(Ordering::SeqCst) > 0 {
                self.races.fetch_sub(1, Ordering::SeqCst);
                let rival = InventoryItem::new(item.code.clone(), NewItem::named("rival"));
                self.inner.insert_item(&rival).await?;
            }
            self.inner.insert_item(item).await
        }

        async fn get_item(&self, code: &Code) -> Result<Option<InventoryItem>> {
            self.inner.get_item(code).await
        }

        async fn list_items(&self) -> Result<Vec<InventoryItem>> {
            self.inner.list_items().await
        }
    }

    #[tokio::test]
    async fn register_assigns_sequential_codes() {
        let store = Arc::new(MemoryStore::new());
        let gen = generator_over(store.clone());
        let a = register_item(&gen, store.as_ref(), NewItem::named("Caneta"), 3)
            .await
            .unwrap();
        let b = register_item(&gen, store.as_ref(), NewItem::named("Papel A4"), 3)
            .await
            .unwrap();
        assert_eq!(a.code.to_string(), "ALM-0001");
        assert_eq!(b.code.to_string(), "ALM-0002");
    }

    #[tokio::test]
    async fn losing_a_race_retries_with_fresh_proposal() {
        let store = Arc::new(RacingStore::new(1));
        let gen = generator_over(store.clone());
        let item = register_item(&gen, store.as_ref(), NewItem::named("Cabo HDMI"), 3)
            .await
            .unwrap();
        assert_eq!(item.code.to_string(), "ALM-0002");
        assert_eq!(store.inner.len().await, 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let store = Arc::new(RacingStore::new(5));
        let gen = generator_over(store.clone());
        let err = register_item(&gen, store.as_ref(), NewItem::named("Toner"), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, AlmoxError::UniquenessViolation(c) if c == "ALM-0002"));
    }

    #[tokio::test]
    async fn two_callers_same_proposal_one_wins() {
        let store = Arc::new(MemoryStore::new());
        for code in ["ALM-0005", "ALM-0006"] {
            let code = Code::parse(code).unwrap();
            register_item_with_code(store.as_ref(), NewItem::named("x"), code, TIMEOUT)
                .await
                .unwrap();
        }
        let gen = generator_over(store.clone());

        let first = gen.next_sequential_code().await.unwrap();
        let second = gen.next_sequential_code().await.unwrap();
        assert_eq!(first.to_string(), "ALM-0007");
        assert_eq!(first, second);

        register_item_with_code(store.as_ref(), NewItem::named("a"), first, TIMEOUT)
            .await
            .unwrap();
        let err = register_item_with_code(store.as_ref(), NewItem::named("b"), second, TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, AlmoxError::UniquenessViolation(_)));

        let retry = gen.next_sequential_code().await.unwrap();
        assert_eq!(retry.to_string(), "ALM-0008");
    }

    #[tokio::test]
    async fn store_failure_is_not_retried() {
        let store = Arc::new(MemoryStore::new());
        store.set_unavailable(true);
        let gen = generator_over(store.clone());
        let err = register_item(&gen, store.as_ref(), NewItem::named("Grampo"), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, AlmoxError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn stalled_insert_times_out_as_unavailable() {
        let store = Arc::new(RacingStore {
            stall_inserts: true,
            ..RacingStore::new(0)
        });
        let settings = GeneratorSettings {
            store_timeout: Duration::from_millis(50),
            ..GeneratorSettings::default()
        };
        let gen = CodeGenerator::new(store.clone(), CodeFormat::default(), settings);
        let err = register_item(&gen, store.as_ref(), NewItem::named("Fita"), 3)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AlmoxError::StoreUnavailable(ref m) if m.starts_with("insert_item timed out")
        ));
        assert!(store.inner.is_empty().await);
    }

    #[tokio::test]
    async fn explicit_code_insert_is_bounded() {
        let store = Arc::new(MemoryStore::new());
        store.set_latency(Duration::from_secs(30));
        let err = register_item_with_code(
            store.as_ref(),
            NewItem::named("Fita"),
            Code::parse("ALM-0001").unwrap(),
            Duration::from_millis(50),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AlmoxError::StoreUnavailable(ref m) if m.contains("timed out")));
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let gen = generator_over(store.clone());
        let err = register_item(&gen, store.as_ref(), NewItem::named("  "), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, AlmoxError::InvalidArgument(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_registrations_never_duplicate() {
        let store = Arc::new(MemoryStore::new());
        let gen = generator_over(store.clone());
        let mut handles = Vec::new();
        for i in 0..8 {
            let gen = gen.clone();
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                register_item(&gen, store.as_ref(), NewItem::named(format!("item {i}")), 20).await
            }));
        }
        let mut codes = Vec::new();
        for h in handles {
            codes.push(h.await.unwrap().unwrap().code);
        }
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 8);
        assert_eq!(store.len().await, 8);
    }
}
