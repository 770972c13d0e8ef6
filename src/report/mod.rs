// SPDX-License-Identifier: GPL-3.0-or-later

//! Rendering of funding reports in multiple output formats.

use crate::config::Config;
use crate::goal::GoalStatus;
use crate::ledger::{format_money, format_short_date};
use crate::reconcile::{DonationDetails, FundingReport};

pub mod html;
pub mod json;
pub mod terminal;

pub const HEADER: &str = "=== Server Fund ===";

/// Which situation the report is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    /// Someone asked for the funding status.
    Fund,
    /// Greeting shown when a player joins; nudges towards donating.
    Welcome,
}

/// Goal status of a computed report; `None` for a degraded one.
pub fn goal_status(report: &FundingReport, config: &Config) -> Option<GoalStatus> {
    report
        .is_ready()
        .then(|| GoalStatus::evaluate(report.net_amount, config.goal_threshold))
}

/// The detail text behind the donation count, one line per entry.
pub fn detail_lines(report: &FundingReport) -> Vec<String> {
    match report.details {
        DonationDetails::NoDonations => Vec::new(),
        DonationDetails::FullyConsumed => {
            vec!["All donations have been consumed by spending.".to_string()]
        }
        DonationDetails::Surplus => {
            let mut lines = vec!["Donations:".to_string()];
            lines.extend(report.displayed_surplus.iter().map(|entry| {
                format!(
                    "{}. {}: {} ({})",
                    entry.sequence_number,
                    entry.donor_name,
                    format_money(entry.surplus_amount),
                    format_short_date(entry.occurred_on)
                )
            }));
            if let Some(more) = more_line(report) {
                lines.push(more);
            }
            lines
        }
    }
}

/// "... and N more donations" when the count runs past the display cap.
pub fn more_line(report: &FundingReport) -> Option<String> {
    match report.hidden_surplus() {
        0 => None,
        1 => Some("... and 1 more donation".to_string()),
        n => Some(format!("... and {n} more donations")),
    }
}

/// Goal lines printed under the summary.
pub fn goal_lines(report: &FundingReport, config: &Config, banner: Banner) -> Vec<String> {
    let Some(status) = goal_status(report, config) else {
        return Vec::new();
    };

    let message = status.message(&config.period_label);
    match (banner, status) {
        (Banner::Fund, _) => vec![message],
        (Banner::Welcome, GoalStatus::BelowGoal) => {
            vec![format!("{message}, use `serverfund donate`")]
        }
        (Banner::Welcome, GoalStatus::Met { .. }) => vec![
            message,
            "Use `serverfund donate` to fund the server".to_string(),
        ],
    }
}
