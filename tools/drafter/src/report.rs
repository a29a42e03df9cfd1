//! Machine-readable run report, merged into an existing file if one is present.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use billing_drafter::{SettlementOutcome, SubmissionReceipt};
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::error;

/// Summary of one invocation, keyed by subcommand in the report file.
pub struct RunSummary<'a> {
    pub command: &'a str,
    pub network: &'a str,
    pub outcome: Value,
}

impl RunSummary<'_> {
    pub fn settlement_outcome(outcome: &SettlementOutcome) -> Value {
        match outcome {
            SettlementOutcome::Succeeded { accounts, receipt } => json!({
                "status": "succeeded",
                "tx_hash": outcome.receipt_id().map(|h| h.to_string()),
                "accounts": accounts.iter().map(|a| a.to_string()).collect::<Vec<_>>(),
                "receipt": receipt_json(receipt),
            }),
            SettlementOutcome::Skipped(reason) => json!({
                "status": "skipped",
                "reason": reason.to_string(),
            }),
            SettlementOutcome::Failed(err) => json!({
                "status": "failed",
                "error": err.to_string(),
            }),
        }
    }

    pub fn billing_outcome(result: &billing_drafter::errors::Result<SubmissionReceipt>) -> Value {
        match result {
            Ok(receipt) => json!({
                "status": "succeeded",
                "receipt": receipt_json(receipt),
            }),
            Err(err) => json!({
                "status": "failed",
                "error": err.to_string(),
            }),
        }
    }
}

fn receipt_json(receipt: &SubmissionReceipt) -> Value {
    let mut entry = json!({ "tx_hash": receipt.transaction_hash.to_string() });
    if let Some(block) = receipt.block_number {
        entry["block_number"] = json!(block);
    }
    if let Some(gas) = receipt.gas_used {
        entry["gas_used"] = json!(gas.to_string());
    }
    entry
}

/// Write the report if one was requested, returning whether it landed on disk.
///
/// The report never decides the exit status: a failure is logged and the run's own result stands.
pub fn record(path: Option<&Path>, summary: &RunSummary<'_>) -> bool {
    let Some(path) = path else {
        return false;
    };
    match write_report(path, summary) {
        Ok(()) => true,
        Err(err) => {
            error!(path = %path.display(), error = format!("{err:#}"), "failed writing run report");
            false
        }
    }
}

pub fn write_report(path: &Path, summary: &RunSummary<'_>) -> Result<()> {
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let existing = if path.exists() {
        fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?
    } else {
        String::new()
    };

    let mut root: Value = if existing.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str(&existing)
            .with_context(|| format!("failed parsing JSON in {}", path.display()))?
    };
    if !root.is_object() {
        root = json!({});
    }

    root["network"] = json!(summary.network);
    root["updated_at"] = json!(now);
    if root.get("runs").and_then(Value::as_object).is_none() {
        root["runs"] = json!({});
    }

    let mut entry = summary.outcome.clone();
    entry["ran_at"] = json!(now);
    root["runs"][summary.command] = entry;

    write_json_atomic(path, &root)
}

fn write_json_atomic(path: &Path, value: &Value) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }

    let serialised = serde_json::to_string_pretty(value).context("failed serialising report JSON")?;
    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, serialised.as_bytes())
        .with_context(|| format!("failed writing temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("failed replacing {}", path.display()))?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
