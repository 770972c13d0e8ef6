// SPDX-License-Identifier: GPL-3.0-or-later

//! Donation records and the money/date formatting shared by every report.
//!
//! Amounts are `rust_decimal::Decimal` throughout. Spending is subtracted
//! from donations one record at a time, and floating point would make the
//! net amount drift from `total_donations - total_spending`.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A single incoming donation as stored in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRecord {
    /// Display name of the donor.
    pub donor_name: String,

    /// Donated amount in `currency`.
    pub amount: Decimal,

    /// Day the donation was received.
    pub occurred_on: NaiveDate,

    /// ISO 4217 currency code (e.g., "USD").
    pub currency: String,
}

impl DonationRecord {
    pub fn new(
        donor_name: impl Into<String>,
        amount: Decimal,
        occurred_on: NaiveDate,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            donor_name: donor_name.into(),
            amount,
            occurred_on,
            currency: currency.into(),
        }
    }

    /// Whether this record is denominated in `currency`.
    ///
    /// Codes are compared case-insensitively so `usd` and `USD` match.
    pub fn is_in(&self, currency: &str) -> bool {
        self.currency.trim().eq_ignore_ascii_case(currency.trim())
    }
}

/// Format an amount as `$1234.50`: two fraction digits, midpoints rounded
/// away from zero.
pub fn format_money(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    format!("${rounded:.2}")
}

/// Format a funding goal without trailing zeros (`$15`, `$12.5`).
pub fn format_goal(goal: Decimal) -> String {
    format!("${}", goal.normalize())
}

/// Month and day, as shown next to each unspent donation.
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%m-%d").to_string()
}
