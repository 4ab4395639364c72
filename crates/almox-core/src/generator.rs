//! Sequential code allocation over a shared store.
//!
//! Every call re-reads the current maximum from the store; nothing is
//! cached or reserved. Returned codes are proposals. Two callers that
//! observe the same maximum propose the same code, and the store's
//! uniqueness constraint decides which persist wins (see
//! [`crate::item::register_item`]).

use crate::code::{Code, CodeFormat};
use crate::error::{AlmoxError, Result};
use crate::store::CodeStore;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    /// Upper bound on each store round-trip.
    pub store_timeout: Duration,
    /// Largest batch `multiple_sequential_codes` will propose.
    pub max_batch: u64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
            max_batch: 1000,
        }
    }
}

#[derive(Clone)]
pub struct CodeGenerator {
    store: Arc<dyn CodeStore>,
    format: CodeFormat,
    settings: GeneratorSettings,
}

impl CodeGenerator {
    pub fn new(store: Arc<dyn CodeStore>, format: CodeFormat, settings: GeneratorSettings) -> Self {
        Self {
            store,
            format,
            settings,
        }
    }

    pub fn format(&self) -> &CodeFormat {
        &self.format
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Propose the code after the current maximum, or the format's first
    /// code when the store is empty. Gaps below the maximum are not reused.
    pub async fn next_sequential_code(&self) -> Result<Code> {
        let max = self.observe_max().await?;
        let next = self.after(max.as_ref(), 0)?;
        debug!(code = %next, "proposed next code");
        Ok(next)
    }

    /// Propose `count` contiguous, strictly increasing codes derived from a
    /// single read of the current maximum.
    pub async fn multiple_sequential_codes(&self, count: i64) -> Result<Vec<Code>> {
        if count <= 0 {
            return Err(AlmoxError::InvalidArgument(format!(
                "count must be positive, got {count}"
            )));
        }
        let count = count as u64;
        if count > self.settings.max_batch {
            return Err(AlmoxError::InvalidArgument(format!(
                "count {count} exceeds the batch limit of {}",
                self.settings.max_batch
            )));
        }

        let max = self.observe_max().await?;
        let codes = (0..count)
            .map(|offset| self.after(max.as_ref(), offset))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            count,
            first = %codes[0],
            last = %codes[codes.len() - 1],
            "proposed code batch"
        );
        Ok(codes)
    }

    /// True iff no record currently holds `candidate`. Read-only.
    pub async fn validate_code_uniqueness(&self, candidate: &Code) -> Result<bool> {
        let exists = self
            .bounded("exists_code", self.store.exists_code(candidate))
            .await?;
        Ok(!exists)
    }

    async fn observe_max(&self) -> Result<Option<Code>> {
        self.bounded("query_max_issued_code", self.store.query_max_issued_code())
            .await
    }

    /// The code `offset` places after `max`'s successor.
    fn after(&self, max: Option<&Code>, offset: u64) -> Result<Code> {
        match max {
            Some(max) => {
                let step = offset
                    .checked_add(1)
                    .ok_or_else(|| AlmoxError::SequenceExhausted(max.to_string()))?;
                max.successor(step)
            }
            None => self.format.first_code()?.successor(offset),
        }
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        bounded(self.settings.store_timeout, op, fut).await
    }
}

/// Run one store round-trip under `timeout`; expiry is `StoreUnavailable`.
pub async fn bounded<T>(
    timeout: Duration,
    op: &'static str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                op,
                timeout_ms = timeout.as_millis() as u64,
                "store round-trip timed out"
            );
            Err(AlmoxError::StoreUnavailable(format!(
                "{op} timed out after {}ms",
                timeout.as_millis()
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
