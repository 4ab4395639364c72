pub mod code;
pub mod config;
pub mod init;
pub mod item;

use almox_core::config::Config;
use almox_core::db::ItemDb;
use almox_core::CodeGenerator;
use anyhow::Context;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

/// An opened warehouse: its config, durable store, and a generator over it.
pub struct Warehouse {
    pub config: Config,
    pub store: Arc<ItemDb>,
    pub generator: CodeGenerator,
}

impl Warehouse {
    pub fn open(root: &Path) -> anyhow::Result<Self> {
        let config = Config::load(root).context("failed to load config")?;
        let path = config.store_path(root);
        let store = Arc::new(
            ItemDb::open(&path).with_context(|| format!("failed to open {}", path.display()))?,
        );
        let generator = CodeGenerator::new(
            store.clone(),
            config.codes.clone(),
            config.generator_settings(),
        );
        Ok(Self {
            config,
            store,
            generator,
        })
    }
}

/// Drive a future to completion on a single-threaded runtime.
pub fn block_on<F: Future>(fut: F) -> anyhow::Result<F::Output> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(rt.block_on(fut))
}
