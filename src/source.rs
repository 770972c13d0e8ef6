// SPDX-License-Identifier: GPL-3.0-or-later

//! Where funding snapshots come from.
//!
//! [`FundingSource`] is the async boundary in front of the reconciler: it
//! yields the donation records and the spending total, and may fail. The
//! reconciler itself never sees a future or an error.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::Config;
use crate::error::FundError;
use crate::ledger::DonationRecord;
use crate::storage::{Storage, StorageResult};

/// A provider of donation records and the cumulative spending total.
pub trait FundingSource {
    /// Donations recorded in `currency`. Order is not guaranteed.
    fn fetch_donations(
        &self,
        currency: &str,
    ) -> impl Future<Output = Result<Vec<DonationRecord>, FundError>> + Send;

    /// Cumulative spending; zero when none has been recorded.
    fn fetch_total_spending(&self) -> impl Future<Output = Result<Decimal, FundError>> + Send;
}

/// Reads the SQLite ledger on the blocking pool, bounded by a timeout.
#[derive(Debug, Clone)]
pub struct LedgerSource {
    path: PathBuf,
    timeout: Duration,
}

impl LedgerSource {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, FundError> {
        let path = config
            .database_path()
            .map_err(|e| FundError::Configuration(e.to_string()))?;
        Ok(Self::new(
            path,
            Duration::from_secs(config.database.timeout_seconds),
        ))
    }

    async fn run<T, F>(&self, query: F) -> Result<T, FundError>
    where
        T: Send + 'static,
        F: FnOnce(&Storage) -> StorageResult<T> + Send + 'static,
    {
        let path = self.path.clone();
        let task = tokio::task::spawn_blocking(move || {
            // A read must never conjure up an empty ledger.
            if !path.exists() {
                return Err(FundError::DataAccess(format!(
                    "ledger not found at {}",
                    path.display()
                )));
            }
            let storage = Storage::open_path(&path)?;
            query(&storage)
        });

        match tokio::time::timeout(self.timeout, task).await {
            Ok(joined) => joined?,
            Err(_) => Err(FundError::Timeout(self.timeout.as_secs())),
        }
    }
}

impl FundingSource for LedgerSource {
    async fn fetch_donations(&self, currency: &str) -> Result<Vec<DonationRecord>, FundError> {
        let currency = currency.to_string();
        let records = self.run(move |s| s.donations_in(&currency)).await?;
        debug!(count = records.len(), path = %self.path.display(), "fetched donations");
        Ok(records)
    }

    async fn fetch_total_spending(&self) -> Result<Decimal, FundError> {
        let total = self.run(|s| s.total_spending()).await?;
        debug!(%total, "fetched total spending");
        Ok(total)
    }
}
