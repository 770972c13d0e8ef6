// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

/// Failures below the reconciler: bad configuration or an unreachable or
/// corrupt ledger. None of these cross into [`crate::reconcile`]; the
/// service turns them into a degraded report.
#[derive(Error, Debug)]
pub enum FundError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Data access error: {0}")]
    DataAccess(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Ledger query timed out after {0} seconds")]
    Timeout(u64),

    #[error("Ledger query task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Coarse classification used for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    DataAccess,
}

impl FundError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FundError::Configuration(_) => ErrorKind::Configuration,
            FundError::DataAccess(_)
            | FundError::Database(_)
            | FundError::Timeout(_)
            | FundError::TaskJoin(_) => ErrorKind::DataAccess,
        }
    }

    /// Short, non-technical text shown instead of the funding summary.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Configuration => {
                "Funding data is not configured. Please check your serverfund config file."
            }
            ErrorKind::DataAccess => {
                "Failed to retrieve funding information. Please try again later."
            }
        }
    }
}
