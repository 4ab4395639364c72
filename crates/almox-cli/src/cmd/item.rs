use super::{block_on, Warehouse};
use crate::output::{print_json, print_table};
use almox_core::item::{register_item, register_item_with_code, InventoryItem, NewItem};
use almox_core::{AlmoxError, Code, ItemStore};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum ItemSubcommand {
    /// Register an item under the next free code
    Add {
        #[arg(required = true)]
        name: Vec<String>,
        /// Unit of measure (e.g. un, kg, cx)
        #[arg(long)]
        unit: Option<String>,
        #[arg(long, default_value = "0")]
        quantity: u64,
        /// Use this exact code instead of the next one; fails if taken
        #[arg(long)]
        code: Option<String>,
    },
    /// List items in code order
    List,
    /// Show a single item
    Show { code: String },
}

pub fn run(root: &Path, subcmd: ItemSubcommand, json: bool) -> anyhow::Result<()> {
    let warehouse = Warehouse::open(root)?;
    match subcmd {
        ItemSubcommand::Add {
            name,
            unit,
            quantity,
            code,
        } => {
            let draft = NewItem {
                name: name.join(" "),
                unit,
                quantity,
            };
            add(&warehouse, draft, code.as_deref(), json)
        }
        ItemSubcommand::List => list(&warehouse, json),
        ItemSubcommand::Show { code } => show(&warehouse, &code, json),
    }
}

fn add(warehouse: &Warehouse, draft: NewItem, code: Option<&str>, json: bool) -> anyhow::Result<()> {
    let store = warehouse.store.as_ref();
    let item = match code {
        Some(raw) => {
            let code = Code::parse(raw)?;
            let timeout = warehouse.generator.settings().store_timeout;
            block_on(register_item_with_code(store, draft, code, timeout))?
        }
        None => block_on(register_item(
            &warehouse.generator,
            store,
            draft,
            warehouse.config.allocation.max_attempts,
        ))?,
    }
    .context("failed to register item")?;

    if json {
        print_json(&item)?;
    } else {
        println!("Registered [{}]: {}", item.code, item.name);
    }
    Ok(())
}

fn list(warehouse: &Warehouse, json: bool) -> anyhow::Result<()> {
    let items = block_on(warehouse.store.list_items())?.context("failed to list items")?;
    if json {
        return print_json(&items);
    }
    if items.is_empty() {
        println!("No items registered.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = items.iter().map(row).collect();
    print_table(&["CODE", "NAME", "QTY", "UNIT", "CREATED"], &rows);
    Ok(())
}

fn row(item: &InventoryItem) -> Vec<String> {
    vec![
        item.code.to_string(),
        item.name.clone(),
        item.quantity.to_string(),
        item.unit.clone().unwrap_or_else(|| "-".to_string()),
        item.created_at.format("%Y-%m-%d %H:%M").to_string(),
    ]
}

fn show(warehouse: &Warehouse, raw: &str, json: bool) -> anyhow::Result<()> {
    let code = Code::parse(raw)?;
    let item = block_on(warehouse.store.get_item(&code))?
        .context("failed to read item")?
        .ok_or_else(|| AlmoxError::ItemNotFound(code.to_string()))?;
    if json {
        return print_json(&item);
    }
    println!("Code:     {}", item.code);
    println!("Name:     {}", item.name);
    println!("Quantity: {}", item.quantity);
    if let Some(unit) = &item.unit {
        println!("Unit:     {unit}");
    }
    println!("Created:  {}", item.created_at.to_rfc3339());
    println!("Id:       {}", item.id);
    Ok(())
}
