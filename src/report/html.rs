// SPDX-License-Identifier: GPL-3.0-or-later

use crate::config::Config;
use crate::ledger::{format_money, format_short_date};
use crate::reconcile::{DonationDetails, FundingReport};
use crate::report::{Banner, goal_lines, goal_status, more_line};

/// Escape HTML special characters.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render a funding report as a standalone HTML page.
pub fn render_html(report: &FundingReport, config: &Config) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Server Fund</title>\n");
    html.push_str("<style>\n");
    html.push_str(
        "body { font-family: system-ui, sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; color: #1a1a1a; }\n",
    );
    html.push_str("h1 { color: #1b5e20; }\n");
    html.push_str("table { border-collapse: collapse; width: 100%; margin: 1rem 0; }\n");
    html.push_str(
        "th, td { text-align: left; padding: 0.5rem 1rem; border-bottom: 1px solid #ddd; }\n",
    );
    html.push_str("th { background: #f5f5f5; }\n");
    html.push_str("tr.even td { background: #fafafa; }\n");
    html.push_str(".below-goal { color: #c62828; }\n");
    html.push_str(".goal-met { color: #b8860b; }\n");
    html.push_str(".meta { color: #666; font-size: 0.9rem; }\n");
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<h1>Server Fund</h1>\n");

    let class = match goal_status(report, config) {
        Some(status) if status.is_met() => "goal-met",
        Some(_) => "below-goal",
        None => "meta",
    };
    html.push_str(&format!(
        "<p class=\"{class}\">{}</p>\n",
        escape_html(&report.summary_text)
    ));

    match report.details {
        DonationDetails::NoDonations => {}
        DonationDetails::FullyConsumed => {
            html.push_str("<p class=\"meta\">All donations have been consumed by spending.</p>\n");
        }
        DonationDetails::Surplus => {
            html.push_str("<h2>Unspent donations</h2>\n");
            html.push_str(
                "<table>\n<tr><th>#</th><th>Donor</th><th>Unspent</th><th>Date</th></tr>\n",
            );
            for entry in &report.displayed_surplus {
                let row_class = if entry.sequence_number % 2 == 0 {
                    "even"
                } else {
                    "odd"
                };
                html.push_str(&format!(
                    "<tr class=\"{row_class}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    entry.sequence_number,
                    escape_html(&entry.donor_name),
                    escape_html(&format_money(entry.surplus_amount)),
                    format_short_date(entry.occurred_on),
                ));
            }
            html.push_str("</table>\n");
            if let Some(more) = more_line(report) {
                html.push_str(&format!("<p class=\"meta\">{}</p>\n", escape_html(&more)));
            }
        }
    }

    for line in goal_lines(report, config, Banner::Fund) {
        html.push_str(&format!("<p>{}</p>\n", escape_html(&line)));
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Generate an HTML report and print it to stdout.
pub fn print_html(report: &FundingReport, config: &Config) {
    print!("{}", render_html(report, config));
}
