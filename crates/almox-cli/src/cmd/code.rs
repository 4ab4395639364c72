use super::{block_on, Warehouse};
use crate::output::print_json;
use almox_core::diagnose::diagnose;
use almox_core::Code;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum CodeSubcommand {
    /// Propose the next code (not reserved until an item is registered)
    Next,
    /// Propose a contiguous batch of codes
    Batch {
        #[arg(allow_negative_numbers = true)]
        count: i64,
    },
    /// Check whether a code is free
    Check { code: String },
    /// Exercise next, batch and uniqueness against the store and report
    Diagnose,
}

pub fn run(root: &Path, subcmd: CodeSubcommand, json: bool) -> anyhow::Result<()> {
    let warehouse = Warehouse::open(root)?;
    match subcmd {
        CodeSubcommand::Next => next(&warehouse, json),
        CodeSubcommand::Batch { count } => batch(&warehouse, count, json),
        CodeSubcommand::Check { code } => check(&warehouse, &code, json),
        CodeSubcommand::Diagnose => run_diagnose(&warehouse, json),
    }
}

fn next(warehouse: &Warehouse, json: bool) -> anyhow::Result<()> {
    let code = block_on(warehouse.generator.next_sequential_code())?
        .context("failed to propose next code")?;
    if json {
        print_json(&serde_json::json!({ "code": code }))?;
    } else {
        println!("{code}");
    }
    Ok(())
}

fn batch(warehouse: &Warehouse, count: i64, json: bool) -> anyhow::Result<()> {
    let codes = block_on(warehouse.generator.multiple_sequential_codes(count))?
        .context("failed to propose codes")?;
    if json {
        print_json(&serde_json::json!({ "codes": codes }))?;
    } else {
        for code in &codes {
            println!("{code}");
        }
    }
    Ok(())
}

fn check(warehouse: &Warehouse, raw: &str, json: bool) -> anyhow::Result<()> {
    let code = Code::parse(raw)?;
    let unique = block_on(warehouse.generator.validate_code_uniqueness(&code))?
        .with_context(|| format!("failed to check '{code}'"))?;
    if json {
        print_json(&serde_json::json!({ "code": code, "unique": unique }))?;
    } else if unique {
        println!("{code} is free");
    } else {
        println!("{code} is already in use");
    }
    Ok(())
}

fn run_diagnose(warehouse: &Warehouse, json: bool) -> anyhow::Result<()> {
    let report = block_on(diagnose(&warehouse.generator))?;
    if json {
        print_json(&report)?;
    } else {
        for step in &report.steps {
            let detail = step
                .value
                .as_deref()
                .or(step.error.as_deref())
                .unwrap_or_default();
            let mark = if step.ok { "ok  " } else { "FAIL" };
            println!("[{mark}] {:<26} {:>5}ms  {detail}", step.step, step.elapsed_ms);
        }
    }
    if !report.healthy() {
        anyhow::bail!("code service diagnostics failed");
    }
    Ok(())
}
