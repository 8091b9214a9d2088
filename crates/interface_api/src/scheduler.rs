//! Monthly netting scheduler
//!
//! A background task that wakes at the start of each settlement period
//! (first of the month, UTC) and runs the netting engine for every
//! organization. Each organization's run is its own transaction; a failure
//! for one organization is logged and does not stop the others.

use chrono::Utc;
use std::time::Duration;
use tracing::{error, info, warn};

use core_kernel::{Amount, SettlementPeriod};
use domain_netting::NettingConfig;
use infra_db::{DatabasePool, NettingRepository};

use crate::config::ApiConfig;

/// Runs the scheduler loop until the process shuts down
pub async fn run_scheduler(pool: DatabasePool, config: ApiConfig) {
    let threshold = Amount::from_minor(config.settlement_threshold_minor);
    let netting_config = match NettingConfig::new(threshold) {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid settlement threshold, scheduler disabled: {}", e);
            return;
        }
    };

    info!(
        threshold = threshold.minor(),
        "netting scheduler started"
    );

    loop {
        let sleep_for = until_next_period();
        info!(seconds = sleep_for.as_secs(), "scheduler sleeping until next period");
        tokio::time::sleep(sleep_for).await;

        let period = SettlementPeriod::current();
        run_all_orgs(&pool, period, &netting_config).await;
    }
}

/// Runs the netting engine for every organization
pub async fn run_all_orgs(pool: &DatabasePool, period: SettlementPeriod, config: &NettingConfig) {
    let repo = NettingRepository::new(pool.clone());
    let orgs = match repo.list_org_ids().await {
        Ok(orgs) => orgs,
        Err(e) => {
            error!("Failed to list organizations for netting: {}", e);
            return;
        }
    };

    info!(period = %period, orgs = orgs.len(), "starting scheduled netting");
    for org_id in orgs {
        match repo.run_for_org(org_id, period, config).await {
            Ok(report) => {
                info!(
                    org = %org_id,
                    bills = report.bills_created,
                    total = report.total_amount.minor(),
                    "scheduled netting run complete"
                );
            }
            Err(e) => {
                warn!(org = %org_id, "netting run failed: {}", e);
            }
        }
    }
}

/// Time remaining until the first instant of the next settlement period
fn until_next_period() -> Duration {
    let next_start = SettlementPeriod::current().next().start();
    let now = Utc::now();
    (next_start - now).to_std().unwrap_or(Duration::from_secs(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_until_next_period_is_bounded_by_a_month() {
        let wait = until_next_period();
        // Never more than 31 days away.
        assert!(wait <= Duration::from_secs(31 * 24 * 3600));
    }
}
