// SPDX-License-Identifier: GPL-3.0-or-later

use comfy_table::{Cell, Color, ContentArrangement, Table};

use crate::config::Config;
use crate::ledger::{format_money, format_short_date};
use crate::reconcile::{DonationDetails, FundingReport, SurplusEntry};
use crate::report::{Banner, HEADER, detail_lines, goal_lines, more_line};

/// Table of unspent donations. Rows alternate between two color sets.
pub fn surplus_table(entries: &[SurplusEntry]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Donor", "Unspent", "Date"]);

    for entry in entries {
        let (name, amount, date) = if entry.sequence_number % 2 == 0 {
            (Color::DarkGrey, Color::DarkGreen, Color::DarkYellow)
        } else {
            (Color::Grey, Color::Green, Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(entry.sequence_number),
            Cell::new(&entry.donor_name).fg(name),
            Cell::new(format_money(entry.surplus_amount)).fg(amount),
            Cell::new(format_short_date(entry.occurred_on)).fg(date),
        ]);
    }

    table
}

/// Render a funding report for the terminal.
pub fn render(report: &FundingReport, config: &Config, banner: Banner) -> String {
    let mut out = format!("{HEADER}\n{}\n", report.summary_text);

    if !report.is_ready() {
        return out;
    }

    match report.details {
        DonationDetails::NoDonations => {}
        DonationDetails::FullyConsumed => {
            out.push_str("\nAll donations have been consumed by spending.\n\n");
        }
        DonationDetails::Surplus => {
            out.push_str(&format!("\n{}\n", surplus_table(&report.displayed_surplus)));
            if let Some(more) = more_line(report) {
                out.push_str(&format!("  {more}\n"));
            }
            out.push('\n');
        }
    }

    for line in goal_lines(report, config, banner) {
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Plain lines without table borders, for pasting into chat or a MOTD.
pub fn render_plain(report: &FundingReport, config: &Config, banner: Banner) -> String {
    let mut lines = vec![HEADER.to_string(), report.summary_text.clone()];
    lines.extend(detail_lines(report));
    lines.extend(goal_lines(report, config, banner));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Print a funding report to stdout.
pub fn print_report(report: &FundingReport, config: &Config, banner: Banner) {
    print!("{}", render(report, config, banner));
}

pub fn print_plain(report: &FundingReport, config: &Config, banner: Banner) {
    print!("{}", render_plain(report, config, banner));
}
