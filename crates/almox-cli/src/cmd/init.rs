use crate::output::print_json;
use almox_core::{config::Config, db::ItemDb, io, paths};
use anyhow::Context;
use std::path::Path;

pub fn run(
    root: &Path,
    name: Option<String>,
    prefix: Option<String>,
    width: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let warehouse_name = name.unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "almoxarifado".to_string())
    });

    let dir = paths::almox_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    let created_config = !config_path.exists();
    let config = if created_config {
        let mut cfg = Config::new(&warehouse_name);
        if let Some(p) = prefix {
            cfg.codes.prefix = p;
        }
        if let Some(w) = width {
            cfg.codes.width = w;
        }
        cfg.codes
            .validate()
            .context("invalid code format")?;
        cfg.save(root).context("failed to write config.yaml")?;
        cfg
    } else {
        if prefix.is_some() || width.is_some() {
            tracing::warn!("config.yaml already exists; --prefix/--width ignored");
        }
        Config::load(root).context("failed to load config")?
    };

    let store_path = config.store_path(root);
    let created_store = !store_path.exists();
    ItemDb::open(&store_path)
        .with_context(|| format!("failed to create {}", store_path.display()))?;

    if json {
        print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "warehouse": config.warehouse.name,
            "config_created": created_config,
            "store_created": created_store,
        }))?;
    } else {
        println!("Initializing almox in: {}", root.display());
        let status = |created: bool| if created { "created:" } else { "exists: " };
        println!("  {} {}", status(created_config), paths::CONFIG_FILE);
        println!("  {} {}", status(created_store), store_path.display());
    }
    Ok(())
}
