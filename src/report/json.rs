// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::Config;
use crate::goal::GoalStatus;
use crate::reconcile::{DonationDetails, FundingReport, ReportStatus, SurplusEntry};
use crate::report::goal_status;

/// A JSON-serializable funding report. Money is serialized as decimal strings.
#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub status: ReportStatus,
    pub currency: &'a str,
    pub goal_threshold: Decimal,
    pub total_donations: Decimal,
    pub total_spending: Decimal,
    pub net_amount: Decimal,
    pub surplus_count: usize,
    pub displayed_surplus: &'a [SurplusEntry],
    pub details: DonationDetails,
    pub goal: Option<GoalStatus>,
    pub summary: &'a str,
}

impl<'a> JsonReport<'a> {
    pub fn new(report: &'a FundingReport, config: &'a Config) -> Self {
        Self {
            status: report.status,
            currency: &config.currency,
            goal_threshold: config.goal_threshold,
            total_donations: report.total_donations,
            total_spending: report.total_spending,
            net_amount: report.net_amount,
            surplus_count: report.surplus_count,
            displayed_surplus: &report.displayed_surplus,
            details: report.details,
            goal: goal_status(report, config),
            summary: &report.summary_text,
        }
    }
}

/// Generate a JSON report and print it to stdout.
pub fn print_json(report: &FundingReport, config: &Config) -> Result<()> {
    let json = serde_json::to_string_pretty(&JsonReport::new(report, config))?;
    println!("{json}");
    Ok(())
}
