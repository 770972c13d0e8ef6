// SPDX-License-Identifier: GPL-3.0-or-later

//! Donation ledger persistence using SQLite.
//!
//! Holds the donations received and the cumulative spending total in
//! ~/.local/share/serverfund/ledger.db (or the configured database path).
//! Amounts are written as decimal text; rows written by other tools as
//! INTEGER or REAL are read as well.

use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::config::Config;
use crate::error::FundError;
use crate::ledger::DonationRecord;

pub type StorageResult<T> = Result<T, FundError>;

/// A stored donation together with its row ID.
#[derive(Debug, Clone)]
pub struct StoredDonation {
    pub id: i64,
    pub record: DonationRecord,
}

/// SQLite-backed donation ledger.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (or create) the ledger configured in `config` and run migrations.
    pub fn open(config: &Config) -> anyhow::Result<Self> {
        let db_path = config.database_path()?;
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
        }
        Self::open_path(&db_path)
            .with_context(|| format!("Failed to open ledger at {}", db_path.display()))
    }

    /// Open (or create) the database at a custom path and run migrations.
    ///
    /// Useful for tests (pass a tempfile path or use `:memory:`).
    pub fn open_path(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    /// Run schema migrations (create tables if they don't exist).
    fn migrate(&self) -> StorageResult<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS donations (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
                name     TEXT    NOT NULL,
                amount   TEXT    NOT NULL,
                date     TEXT    NOT NULL,
                currency TEXT    NOT NULL DEFAULT 'USD'
            );

            CREATE INDEX IF NOT EXISTS idx_donations_currency_date
                ON donations(currency, date);

            CREATE TABLE IF NOT EXISTS total_spending (
                id          INTEGER PRIMARY KEY CHECK (id = 1),
                total_spent TEXT    NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    // --- Donations ---

    /// Record a donation, returning the row ID.
    pub fn save_donation(&self, donation: &DonationRecord) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO donations (name, amount, date, currency)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                donation.donor_name,
                donation.amount.to_string(),
                donation.occurred_on.format("%Y-%m-%d").to_string(),
                donation.currency.trim().to_uppercase(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    /// All donations in `currency`, oldest first. Same-day donations come
    /// back in insertion order.
    pub fn donations_in(&self, currency: &str) -> StorageResult<Vec<DonationRecord>> {
        let rows = self.query_donations(
            "SELECT id, name, amount, date, currency
             FROM donations
             WHERE UPPER(TRIM(currency)) = UPPER(TRIM(?1))
             ORDER BY date, id",
            params![currency],
        )?;
        Ok(rows.into_iter().map(|d| d.record).collect())
    }

    /// Every donation in the ledger, oldest first, with row IDs.
    pub fn all_donations(&self) -> StorageResult<Vec<StoredDonation>> {
        self.query_donations(
            "SELECT id, name, amount, date, currency
             FROM donations
             ORDER BY date, id",
            params![],
        )
    }

    fn query_donations<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> StorageResult<Vec<StoredDonation>> {
        let mut stmt = self.conn.prepare(sql)?;

        let rows = stmt
            .query_map(params, |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Value>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .map(|r| -> StorageResult<StoredDonation> {
                let (id, name, amount, date, currency) = r?;
                let amount = decimal_from_sql(amount)
                    .map_err(|e| FundError::DataAccess(format!("donation {id}: {e}")))?;
                let occurred_on = parse_date(&date)
                    .map_err(|e| FundError::DataAccess(format!("donation {id}: {e}")))?;
                Ok(StoredDonation {
                    id,
                    record: DonationRecord {
                        donor_name: name,
                        amount,
                        occurred_on,
                        currency,
                    },
                })
            })
            .collect::<StorageResult<Vec<_>>>()?;

        Ok(rows)
    }

    // --- Spending ---

    /// Cumulative spending to date, or zero if nothing has been recorded.
    pub fn total_spending(&self) -> StorageResult<Decimal> {
        let mut stmt = self
            .conn
            .prepare("SELECT total_spent FROM total_spending WHERE id = 1")?;

        match stmt.query_row([], |row| row.get::<_, Value>(0)) {
            Ok(value) => decimal_from_sql(value)
                .map_err(|e| FundError::DataAccess(format!("total_spending: {e}"))),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Decimal::ZERO),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the cumulative spending total.
    pub fn set_total_spending(&self, total: Decimal) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO total_spending (id, total_spent) VALUES (1, ?1)",
            params![total.to_string()],
        )?;
        Ok(())
    }

    /// Add `amount` to the spending total, returning the new total.
    pub fn add_spending(&self, amount: Decimal) -> StorageResult<Decimal> {
        let tx = self.conn.unchecked_transaction()?;
        let total = self
            .total_spending()?
            .checked_add(amount)
            .ok_or_else(|| {
                FundError::DataAccess(format!("spending total overflows adding {amount}"))
            })?;
        tx.execute(
            "INSERT OR REPLACE INTO total_spending (id, total_spent) VALUES (1, ?1)",
            params![total.to_string()],
        )?;
        tx.commit()?;
        Ok(total)
    }
}

/// Read a money column written as TEXT, INTEGER or REAL.
fn decimal_from_sql(value: Value) -> Result<Decimal, String> {
    match value {
        Value::Text(s) => {
            Decimal::from_str(s.trim()).map_err(|_| format!("invalid amount '{s}'"))
        }
        Value::Integer(i) => Ok(Decimal::from(i)),
        Value::Real(f) => Decimal::from_f64(f).ok_or_else(|| format!("invalid amount {f}")),
        Value::Null => Err("missing amount".to_string()),
        Value::Blob(_) => Err("amount stored as blob".to_string()),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // Accept full timestamps too; only the day matters.
    let day = s.trim().get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| format!("invalid date '{s}'"))
}
