//! Self-test of the code service: exercises next, batch and uniqueness
//! against the live store and reports each step instead of failing fast.

use crate::generator::CodeGenerator;
use serde::Serialize;
use std::time::Instant;

pub const DIAGNOSE_BATCH: i64 = 3;

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub steps: Vec<StepReport>,
}

impl DiagnosticReport {
    pub fn healthy(&self) -> bool {
        self.steps.iter().all(|s| s.ok)
    }
}

fn step<T, E: std::fmt::Display>(
    name: &'static str,
    started: Instant,
    outcome: std::result::Result<T, E>,
    render: impl FnOnce(&T) -> String,
) -> StepReport {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match outcome {
        Ok(v) => StepReport {
            step: name,
            ok: true,
            value: Some(render(&v)),
            error: None,
            elapsed_ms,
        },
        Err(e) => StepReport {
            step: name,
            ok: false,
            value: None,
            error: Some(e.to_string()),
            elapsed_ms,
        },
    }
}

pub async fn diagnose(generator: &CodeGenerator) -> DiagnosticReport {
    let mut steps = Vec::with_capacity(3);

    let started = Instant::now();
    let next = generator.next_sequential_code().await;
    let proposal = next.as_ref().ok().cloned();
    steps.push(step("next_sequential_code", started, next, |c| c.to_string()));

    let started = Instant::now();
    let batch = generator.multiple_sequential_codes(DIAGNOSE_BATCH).await;
    steps.push(step("multiple_sequential_codes", started, batch, |codes| {
        codes
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }));

    let started = Instant::now();
    let unique = match &proposal {
        Some(code) => generator.validate_code_uniqueness(code).await.map_err(|e| e.to_string()),
        None => Err("skipped: no proposal to check".to_string()),
    };
    steps.push(step("validate_code_uniqueness", started, unique, |&u| {
        let verdict = if u { "unique" } else { "taken" };
        verdict.to_string()
    }));

    DiagnosticReport { steps }
}
