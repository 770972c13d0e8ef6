// SPDX-License-Identifier: GPL-3.0-or-later

//! Reconciliation of the donation ledger against cumulative spending.
//!
//! Spending is charged against donations oldest first. Whatever a donation
//! still holds after that is its *surplus*: money the community can see as
//! still on hand. [`reconcile`] turns a snapshot of records plus a spending
//! figure into a [`FundingReport`]. It is a pure function: no I/O, no shared
//! state, and the same input always yields an equal report.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::ledger::{DonationRecord, format_goal, format_money};

/// How many surplus entries a report keeps for display.
pub const DEFAULT_DISPLAY_CAP: usize = 10;

/// Inputs to [`reconcile`] that come from configuration rather than the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileSettings {
    /// Only records in this currency take part.
    pub currency: String,

    /// Maximum number of surplus entries kept in `displayed_surplus`.
    pub display_cap: usize,

    /// Net amount that covers one funding period; embedded in the summary.
    pub goal_threshold: Decimal,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            display_cap: DEFAULT_DISPLAY_CAP,
            goal_threshold: Decimal::from(15),
        }
    }
}

impl From<&Config> for ReconcileSettings {
    fn from(config: &Config) -> Self {
        Self {
            currency: config.currency.clone(),
            display_cap: config.display_cap,
            goal_threshold: config.goal_threshold,
        }
    }
}

/// A donation (or the unconsumed part of one) still on the books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurplusEntry {
    /// 1-based position among surplus entries, in reconciliation order.
    pub sequence_number: usize,
    pub donor_name: String,
    pub surplus_amount: Decimal,
    pub occurred_on: NaiveDate,
}

/// Whether the report was computed or stands in for a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Ready,
    Unavailable,
}

/// What the detail view should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationDetails {
    /// No qualifying donations at all.
    NoDonations,
    /// Donations exist but spending has absorbed every one of them.
    FullyConsumed,
    /// At least one donation still has surplus.
    Surplus,
}

/// Funding status of the server at the time of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundingReport {
    pub status: ReportStatus,
    pub total_donations: Decimal,
    pub total_spending: Decimal,
    /// Always `total_donations - total_spending`.
    pub net_amount: Decimal,
    /// Number of donations with surplus, including those past the display cap.
    pub surplus_count: usize,
    pub displayed_surplus: Vec<SurplusEntry>,
    pub details: DonationDetails,
    pub summary_text: String,
    pub has_any_donations: bool,
}

impl FundingReport {
    /// A report for when the snapshot could not be fetched. Carries `message`
    /// in place of a summary and no numbers.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: ReportStatus::Unavailable,
            total_donations: Decimal::ZERO,
            total_spending: Decimal::ZERO,
            net_amount: Decimal::ZERO,
            surplus_count: 0,
            displayed_surplus: Vec::new(),
            details: DonationDetails::NoDonations,
            summary_text: message.into(),
            has_any_donations: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == ReportStatus::Ready
    }

    /// Surplus donations that were counted but cut by the display cap.
    pub fn hidden_surplus(&self) -> usize {
        self.surplus_count - self.displayed_surplus.len()
    }
}

/// Charge `spending` against `records` oldest first and report what is left.
///
/// Records in other currencies are ignored. Records sharing a date keep
/// their input order. Negative spending or amounts are treated as zero, as
/// is any amount that would overflow the running total.
pub fn reconcile(
    records: &[DonationRecord],
    spending: Decimal,
    settings: &ReconcileSettings,
) -> FundingReport {
    let spending = clamp_negative(spending, "spending");

    let mut qualifying: Vec<(&DonationRecord, Decimal)> = records
        .iter()
        .filter(|r| r.is_in(&settings.currency))
        .map(|r| (r, clamp_negative(r.amount, "donation amount")))
        .collect();

    // Stable: equal dates stay in input order.
    qualifying.sort_by_key(|(r, _)| r.occurred_on);

    let total_donations = total_without_overflow(&mut qualifying);

    let mut remaining = spending;
    let mut surplus_count = 0;
    let mut displayed_surplus = Vec::new();

    for (record, amount) in &qualifying {
        if remaining >= *amount {
            remaining -= *amount;
            continue;
        }

        let surplus_amount = *amount - remaining;
        remaining = Decimal::ZERO;
        surplus_count += 1;

        // Keep walking past the cap so the count stays exact.
        if displayed_surplus.len() < settings.display_cap {
            displayed_surplus.push(SurplusEntry {
                sequence_number: surplus_count,
                donor_name: record.donor_name.clone(),
                surplus_amount,
                occurred_on: record.occurred_on,
            });
        }
    }

    let net_amount = total_donations - spending;
    let has_any_donations = !total_donations.is_zero();

    let details = if !has_any_donations {
        DonationDetails::NoDonations
    } else if surplus_count == 0 {
        DonationDetails::FullyConsumed
    } else {
        DonationDetails::Surplus
    };

    let summary_text = match details {
        DonationDetails::NoDonations => "No donations found.".to_string(),
        _ => format!(
            "{} / {} ({} {})",
            format_money(net_amount),
            format_goal(settings.goal_threshold),
            surplus_count,
            if surplus_count == 1 {
                "donation"
            } else {
                "donations"
            }
        ),
    };

    debug!(
        records = qualifying.len(),
        %total_donations,
        %spending,
        surplus_count,
        "reconciled donation ledger"
    );

    FundingReport {
        status: ReportStatus::Ready,
        total_donations,
        total_spending: spending,
        net_amount,
        surplus_count,
        displayed_surplus,
        details,
        summary_text,
        has_any_donations,
    }
}

/// Sum the amounts with `checked_add`. A record that would overflow the
/// total is zeroed so the walk below never sees it.
fn total_without_overflow(qualifying: &mut [(&DonationRecord, Decimal)]) -> Decimal {
    let mut total = Decimal::ZERO;
    for (record, amount) in qualifying.iter_mut() {
        match total.checked_add(*amount) {
            Some(sum) => total = sum,
            None => {
                warn!(
                    donor = %record.donor_name,
                    amount = %amount,
                    "donation overflows the ledger total, treated as zero"
                );
                *amount = Decimal::ZERO;
            }
        }
    }
    total
}

fn clamp_negative(value: Decimal, what: &str) -> Decimal {
    if value.is_sign_negative() && !value.is_zero() {
        warn!(%value, "negative {what} treated as zero");
        Decimal::ZERO
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Duration::days(i64::from(n))
    }

    fn usd(name: &str, amount: Decimal, on: u32) -> DonationRecord {
        DonationRecord::new(name, amount, day(on), "USD")
    }

    fn run(records: &[DonationRecord], spending: Decimal) -> FundingReport {
        reconcile(records, spending, &ReconcileSettings::default())
    }

    #[test]
    fn partial_consumption_leaves_remainder() {
        let records = vec![usd("ann", dec!(10), 1), usd("bob", dec!(10), 2)];
        let report = run(&records, dec!(15));

        assert_eq!(report.surplus_count, 1);
        assert_eq!(report.displayed_surplus.len(), 1);
        assert_eq!(report.displayed_surplus[0].donor_name, "bob");
        assert_eq!(report.displayed_surplus[0].surplus_amount, dec!(5));
        assert_eq!(report.displayed_surplus[0].sequence_number, 1);
        assert_eq!(report.net_amount, dec!(5));
        assert_eq!(report.details, DonationDetails::Surplus);
    }

    #[test]
    fn zero_spending_shows_every_donation_in_date_order() {
        let records = vec![
            usd("carol", dec!(3), 5),
            usd("ann", dec!(1), 1),
            usd("bob", dec!(2), 3),
        ];
        let report = run(&records, dec!(0));

        let names: Vec<_> = report
            .displayed_surplus
            .iter()
            .map(|e| e.donor_name.as_str())
            .collect();
        assert_eq!(names, vec!["ann", "bob", "carol"]);

        let numbers: Vec<_> = report
            .displayed_surplus
            .iter()
            .map(|e| e.sequence_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(report.displayed_surplus[2].surplus_amount, dec!(3));
        assert_eq!(report.surplus_count, 3);
    }

    #[test]
    fn count_continues_past_display_cap() {
        let records: Vec<_> = (0..15)
            .map(|i| usd(&format!("donor{i}"), dec!(2), i))
            .collect();
        let report = run(&records, dec!(0));

        assert_eq!(report.surplus_count, 15);
        assert_eq!(report.displayed_surplus.len(), 10);
        assert_eq!(report.hidden_surplus(), 5);
        assert_eq!(report.displayed_surplus[9].sequence_number, 10);
        assert_eq!(report.displayed_surplus[9].donor_name, "donor9");
        assert_eq!(report.summary_text, "$30.00 / $15 (15 donations)");
    }

    #[test]
    fn count_past_cap_after_partial_consumption() {
        // First three are eaten, the fourth is split, then twelve more follow.
        let records: Vec<_> = (0..16)
            .map(|i| usd(&format!("donor{i}"), dec!(4), i))
            .collect();
        let report = run(&records, dec!(13));

        assert_eq!(report.surplus_count, 13);
        assert_eq!(report.displayed_surplus.len(), 10);
        assert_eq!(report.displayed_surplus[0].donor_name, "donor3");
        assert_eq!(report.displayed_surplus[0].surplus_amount, dec!(3));
        assert_eq!(report.displayed_surplus[1].surplus_amount, dec!(4));

        let shown: Decimal = report
            .displayed_surplus
            .iter()
            .map(|e| e.surplus_amount)
            .sum();
        assert_eq!(shown, dec!(39));
        assert_eq!(report.net_amount, dec!(51));
    }

    #[test]
    fn spending_equal_to_donations_is_fully_consumed() {
        let records = vec![usd("ann", dec!(10), 1), usd("bob", dec!(5), 2)];
        let report = run(&records, dec!(15));

        assert_eq!(report.surplus_count, 0);
        assert!(report.displayed_surplus.is_empty());
        assert!(report.has_any_donations);
        assert_eq!(report.details, DonationDetails::FullyConsumed);
        assert_eq!(report.net_amount, dec!(0));
        assert_eq!(report.summary_text, "$0.00 / $15 (0 donations)");
    }

    #[test]
    fn overspending_is_fully_consumed_with_negative_net() {
        let records = vec![usd("ann", dec!(10), 1)];
        let report = run(&records, dec!(25.50));

        assert_eq!(report.details, DonationDetails::FullyConsumed);
        assert_eq!(report.net_amount, dec!(-15.50));
        assert_eq!(report.summary_text, "$-15.50 / $15 (0 donations)");
    }

    #[test]
    fn no_records_means_no_donations_regardless_of_spending() {
        for spending in [dec!(0), dec!(40)] {
            let report = run(&[], spending);
            assert_eq!(report.details, DonationDetails::NoDonations);
            assert!(!report.has_any_donations);
            assert_eq!(report.surplus_count, 0);
            assert!(report.displayed_surplus.is_empty());
            assert_eq!(report.summary_text, "No donations found.");
            assert_eq!(report.net_amount, -spending);
        }
    }

    #[test]
    fn other_currencies_are_excluded() {
        let records = vec![
            usd("ann", dec!(10), 1),
            DonationRecord::new("eve", dec!(100), day(0), "EUR"),
            usd("bob", dec!(7), 2),
        ];
        let report = run(&records, dec!(12));

        assert_eq!(report.total_donations, dec!(17));
        assert_eq!(report.surplus_count, 1);
        assert_eq!(report.displayed_surplus[0].donor_name, "bob");
        assert_eq!(report.displayed_surplus[0].surplus_amount, dec!(5));
    }

    #[test]
    fn only_foreign_records_means_no_donations() {
        let records = vec![DonationRecord::new("eve", dec!(100), day(0), "EUR")];
        let report = run(&records, dec!(0));
        assert_eq!(report.details, DonationDetails::NoDonations);
    }

    #[test]
    fn same_day_donations_keep_input_order() {
        let records = vec![
            usd("first", dec!(5), 1),
            usd("second", dec!(5), 1),
            usd("third", dec!(5), 1),
        ];
        let report = run(&records, dec!(7));

        assert_eq!(report.surplus_count, 2);
        assert_eq!(report.displayed_surplus[0].donor_name, "second");
        assert_eq!(report.displayed_surplus[0].surplus_amount, dec!(3));
        assert_eq!(report.displayed_surplus[1].donor_name, "third");
    }

    #[test]
    fn negative_spending_is_treated_as_zero() {
        let records = vec![usd("ann", dec!(10), 1)];
        let report = run(&records, dec!(-5));

        assert_eq!(report.total_spending, dec!(0));
        assert_eq!(report.net_amount, dec!(10));
        assert_eq!(report.surplus_count, 1);
    }

    #[test]
    fn negative_amount_is_treated_as_zero() {
        let records = vec![usd("ann", dec!(-10), 1), usd("bob", dec!(4), 2)];
        let report = run(&records, dec!(0));

        assert_eq!(report.total_donations, dec!(4));
        assert_eq!(report.surplus_count, 1);
        assert_eq!(report.displayed_surplus[0].donor_name, "bob");
    }

    #[test]
    fn zero_amount_never_counts_as_surplus() {
        let records = vec![usd("ann", dec!(0), 1), usd("bob", dec!(3), 2)];
        let report = run(&records, dec!(0));

        assert_eq!(report.surplus_count, 1);
        assert_eq!(report.displayed_surplus[0].donor_name, "bob");
        assert_eq!(report.displayed_surplus[0].sequence_number, 1);
    }

    #[test]
    fn single_surplus_uses_singular() {
        let records = vec![usd("ann", dec!(20), 1)];
        let report = run(&records, dec!(0));
        assert_eq!(report.summary_text, "$20.00 / $15 (1 donation)");
    }

    #[test]
    fn net_is_exact_with_fractional_amounts() {
        let records = vec![
            usd("ann", dec!(0.10), 1),
            usd("bob", dec!(0.20), 2),
            usd("cid", dec!(0.05), 3),
        ];
        let report = run(&records, dec!(0.30));

        assert_eq!(report.total_donations, dec!(0.35));
        assert_eq!(report.net_amount, dec!(0.05));
        assert_eq!(
            report.net_amount,
            report.total_donations - report.total_spending
        );
        assert_eq!(report.surplus_count, 1);
        assert_eq!(report.displayed_surplus[0].surplus_amount, dec!(0.05));
    }

    #[test]
    fn custom_settings_change_cap_and_goal() {
        let settings = ReconcileSettings {
            currency: "EUR".to_string(),
            display_cap: 2,
            goal_threshold: dec!(12.5),
        };
        let records: Vec<_> = (0..4)
            .map(|i| DonationRecord::new(format!("d{i}"), dec!(1), day(i), "EUR"))
            .collect();
        let report = reconcile(&records, dec!(0), &settings);

        assert_eq!(report.displayed_surplus.len(), 2);
        assert_eq!(report.surplus_count, 4);
        assert_eq!(report.summary_text, "$4.00 / $12.5 (4 donations)");
    }

    #[test]
    fn overflowing_amount_is_treated_as_zero() {
        let records = vec![usd("whale", Decimal::MAX, 1), usd("ann", dec!(1), 2)];
        let report = run(&records, dec!(0));

        assert!(report.is_ready());
        assert_eq!(report.total_donations, Decimal::MAX);
        assert_eq!(report.net_amount, Decimal::MAX);
        assert_eq!(report.surplus_count, 1);
        assert_eq!(report.displayed_surplus[0].donor_name, "whale");
    }

    #[test]
    fn overflow_keeps_later_records_that_fit() {
        let records = vec![
            usd("whale", Decimal::MAX - dec!(5), 1),
            usd("big", dec!(10), 2),
            usd("small", dec!(5), 3),
        ];
        let report = run(&records, dec!(0));

        assert_eq!(report.total_donations, Decimal::MAX);
        let names: Vec<_> = report
            .displayed_surplus
            .iter()
            .map(|e| e.donor_name.as_str())
            .collect();
        assert_eq!(names, vec!["whale", "small"]);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let records = vec![
            usd("ann", dec!(10), 3),
            usd("bob", dec!(2.5), 1),
            usd("cid", dec!(8), 2),
        ];
        let first = run(&records, dec!(6));
        let second = run(&records, dec!(6));
        assert_eq!(first, second);
    }

    #[test]
    fn unavailable_report_has_no_numbers() {
        let report = FundingReport::unavailable("Failed to retrieve funding information.");
        assert!(!report.is_ready());
        assert_eq!(report.total_donations, dec!(0));
        assert_eq!(report.total_spending, dec!(0));
        assert_eq!(report.net_amount, dec!(0));
        assert_eq!(report.surplus_count, 0);
        assert!(report.displayed_surplus.is_empty());
        assert_eq!(
            report.summary_text,
            "Failed to retrieve funding information."
        );
    }
}
