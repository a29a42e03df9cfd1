//! Inputs produced by the external analytics layer.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use billing_drafter::types::{BillingData, PaymentStatusRecord};
use serde::de::DeserializeOwned;

/// Supplier of the current period's payment-status records.
///
/// Records are treated as already validated; status is never re-derived from the amounts.
#[async_trait]
pub trait PaymentStatusSource {
    async fn payment_statuses(&self) -> Result<Vec<PaymentStatusRecord>>;
}

/// Reads query results exported as JSON.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn billing_data(&self) -> Result<BillingData> {
        self.read()
    }

    fn read<T: DeserializeOwned>(&self) -> Result<T> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed reading {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed parsing JSON in {}", self.path.display()))
    }
}

#[async_trait]
impl PaymentStatusSource for JsonFileSource {
    async fn payment_statuses(&self) -> Result<Vec<PaymentStatusRecord>> {
        self.read()
    }
}
