// SPDX-License-Identifier: GPL-3.0-or-later

//! Funding goal rules: whether the net amount reaches the goal threshold and
//! how many funding periods it pays for.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GoalStatus {
    /// Net funding is below one period of costs.
    BelowGoal,
    /// Net funding covers at least one full period.
    Met { periods: u32 },
}

impl GoalStatus {
    /// Compare `net` with `goal_threshold`, which must be positive.
    pub fn evaluate(net: Decimal, goal_threshold: Decimal) -> Self {
        if goal_threshold <= Decimal::ZERO || net < goal_threshold {
            return GoalStatus::BelowGoal;
        }
        // Saturate when the quotient overflows or exceeds u32.
        let periods = net
            .checked_div(goal_threshold)
            .and_then(|q| q.floor().to_u32())
            .unwrap_or(u32::MAX);
        GoalStatus::Met { periods }
    }

    pub fn is_met(&self) -> bool {
        matches!(self, GoalStatus::Met { .. })
    }

    /// Human-readable goal line, e.g. "Covers 2 months of server costs".
    pub fn message(&self, period_label: &str) -> String {
        match self {
            GoalStatus::BelowGoal => "Server is below the funding goal".to_string(),
            GoalStatus::Met { periods } => {
                let unit = if *periods == 1 {
                    period_label.to_string()
                } else {
                    format!("{period_label}s")
                };
                format!("Covers {periods} {unit} of server costs")
            }
        }
    }
}
