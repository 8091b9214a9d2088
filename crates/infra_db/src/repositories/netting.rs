//! Netting run repository
//!
//! Executes one netting run per organization inside a single transaction:
//! takes a per-organization advisory lock, snapshots member balances with
//! row locks, offsets open-bill exposure, runs the greedy engine, and
//! persists the proposed bills. A failed run rolls back completely and is
//! safe to re-run.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use core_kernel::{Amount, OrgId, SettlementPeriod, UserId};
use domain_bills::Bill;
use domain_netting::{effective_balances, net_balances, MemberBalance, NettingConfig};

use crate::error::RepositoryError;
use crate::repositories::bills::{insert_bill, open_obligations};

/// Outcome of one netting run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NettingRunReport {
    /// Organization the run covered
    pub org_id: OrgId,
    /// Settlement period the bills were created for
    pub period: SettlementPeriod,
    /// Number of bills created
    pub bills_created: usize,
    /// Sum of created bill amounts
    pub total_amount: Amount,
}

/// Repository driving netting runs
#[derive(Debug, Clone)]
pub struct NettingRepository {
    pool: PgPool,
}

impl NettingRepository {
    /// Creates a new NettingRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the netting engine for one organization and period
    ///
    /// Holds the organization's advisory lock for the duration of the
    /// transaction, so concurrent runs for the same organization serialize
    /// while runs for different organizations proceed in parallel.
    pub async fn run_for_org(
        &self,
        org_id: OrgId,
        period: SettlementPeriod,
        config: &NettingConfig,
    ) -> Result<NettingRunReport, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(advisory_key(org_id))
            .execute(&mut *tx)
            .await?;

        let snapshot = member_balances(&mut tx, org_id).await?;
        let open = open_obligations(&mut tx, org_id).await?;
        let effective = effective_balances(&snapshot, &open);

        let proposals = net_balances(&effective, period, config)?;
        let mut total_amount = Amount::ZERO;
        for proposal in &proposals {
            let bill = Bill::from_proposal(org_id, proposal).map_err(RepositoryError::Bill)?;
            insert_bill(&mut tx, &bill).await?;
            total_amount += proposal.amount;
        }

        tx.commit().await?;

        let report = NettingRunReport {
            org_id,
            period,
            bills_created: proposals.len(),
            total_amount,
        };
        info!(
            org = %org_id,
            period = %period,
            bills = report.bills_created,
            total = report.total_amount.minor(),
            "netting run committed"
        );
        Ok(report)
    }

    /// All organization ids, for the periodic scheduler
    pub async fn list_org_ids(&self) -> Result<Vec<OrgId>, RepositoryError> {
        let rows = sqlx::query_as::<_, (Uuid,)>("SELECT org_id FROM organizations ORDER BY org_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id,)| OrgId::from(id)).collect())
    }
}

/// Snapshots all member balances of an organization with row locks
///
/// The locks pin the balances for the duration of the run's transaction so
/// a concurrent settlement cannot move a balance mid-computation.
async fn member_balances(
    tx: &mut Transaction<'_, Postgres>,
    org_id: OrgId,
) -> Result<Vec<MemberBalance>, RepositoryError> {
    let rows = sqlx::query_as::<_, (Uuid, i64)>(
        r#"
        SELECT user_id, balance_minor FROM org_members
        WHERE org_id = $1
        ORDER BY user_id
        FOR UPDATE
        "#,
    )
    .bind(Uuid::from(org_id))
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(user_id, balance)| {
            MemberBalance::new(UserId::from(user_id), Amount::from_minor(balance))
        })
        .collect())
}

/// Derives a stable advisory lock key from the organization id
fn advisory_key(org_id: OrgId) -> i64 {
    let b = Uuid::from(org_id).into_bytes();
    i64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}
