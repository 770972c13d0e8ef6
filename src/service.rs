// SPDX-License-Identifier: GPL-3.0-or-later

//! Fetch a funding snapshot, then reconcile it.
//!
//! Every failure on the way (bad configuration, unreachable or corrupt
//! ledger, timeouts) ends up as an [`FundingReport::unavailable`] value so
//! callers always have something to render.

use tracing::{error, info, warn};

use crate::config::Config;
use crate::reconcile::{FundingReport, ReconcileSettings, reconcile};
use crate::source::{FundingSource, LedgerSource};

/// Build a funding report from `source` using the settings in `config`.
pub async fn funding_report<S: FundingSource>(config: &Config, source: &S) -> FundingReport {
    if let Err(e) = config.validate() {
        warn!(error = %e, "funding report skipped");
        return FundingReport::unavailable(e.user_message());
    }

    let snapshot = tokio::try_join!(
        source.fetch_donations(&config.currency),
        source.fetch_total_spending()
    );

    match snapshot {
        Ok((records, spending)) => {
            let report = reconcile(&records, spending, &ReconcileSettings::from(config));
            info!(
                net = %report.net_amount,
                surplus_count = report.surplus_count,
                "funding report ready"
            );
            report
        }
        Err(e) => {
            error!(error = %e, "failed to retrieve funding data");
            FundingReport::unavailable(e.user_message())
        }
    }
}

/// Build a funding report from the SQLite ledger named in `config`.
pub async fn ledger_report(config: &Config) -> FundingReport {
    match LedgerSource::from_config(config) {
        Ok(source) => funding_report(config, &source).await,
        Err(e) => {
            error!(error = %e, "could not locate the ledger");
            FundingReport::unavailable(e.user_message())
        }
    }
}
