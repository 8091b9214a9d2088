//! Bill repository implementation
//!
//! Executes bill lifecycle transitions against PostgreSQL. Every transition
//! locks the bill row `FOR UPDATE`, applies the domain state machine, writes
//! the resulting ledger postings (if any), updates the bill, and appends one
//! audit action, all in a single transaction.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use core_kernel::{Amount, BillActionId, BillId, OrgId, SettlementPeriod, UserId};
use domain_bills::{
    AcknowledgeEffect, Bill, BillAction, BillActionType, BillRole, BillSplitSummary, BillStatus,
    ResolutionOutcome,
};
use domain_netting::OpenObligation;

use crate::error::{DatabaseError, RepositoryError};
use crate::repositories::ledger::apply_entries;

/// Repository for bills and their audit trail
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: PgPool,
}

impl BillRepository {
    /// Creates a new BillRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches a bill by id
    pub async fn find(&self, bill_id: BillId) -> Result<Bill, RepositoryError> {
        let row = sqlx::query_as::<_, BillRow>("SELECT * FROM bills WHERE bill_id = $1")
            .bind(Uuid::from(bill_id))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Bill", bill_id))?;
        row.into_domain()
    }

    /// Lists bills where the member is debtor or creditor
    ///
    /// With `include_history` false only open bills (pending, disputed) are
    /// returned; with it true the settled and resolved history is included.
    pub async fn list_for_member(
        &self,
        org_id: OrgId,
        user_id: UserId,
        include_history: bool,
    ) -> Result<Vec<Bill>, RepositoryError> {
        let rows = sqlx::query_as::<_, BillRow>(
            r#"
            SELECT * FROM bills
            WHERE org_id = $1
              AND (debtor_id = $2 OR creditor_id = $2)
              AND ($3 OR status IN ('pending', 'disputed'))
            ORDER BY created_at DESC, bill_id
            "#,
        )
        .bind(Uuid::from(org_id))
        .bind(Uuid::from(user_id))
        .bind(include_history)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BillRow::into_domain).collect()
    }

    /// Lists an organization's disputed bills, oldest dispute first
    pub async fn list_disputed(&self, org_id: OrgId) -> Result<Vec<Bill>, RepositoryError> {
        self.list_by_status(org_id, BillStatus::Disputed).await
    }

    /// Lists an organization's admin-resolved bills, newest first
    pub async fn list_resolved(&self, org_id: OrgId) -> Result<Vec<Bill>, RepositoryError> {
        self.list_by_status(org_id, BillStatus::AdminResolved).await
    }

    async fn list_by_status(
        &self,
        org_id: OrgId,
        status: BillStatus,
    ) -> Result<Vec<Bill>, RepositoryError> {
        let rows = sqlx::query_as::<_, BillRow>(
            r#"
            SELECT * FROM bills
            WHERE org_id = $1 AND status = $2
            ORDER BY updated_at DESC, bill_id
            "#,
        )
        .bind(Uuid::from(org_id))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BillRow::into_domain).collect()
    }

    /// Records an acknowledgment from one of the bill's parties
    ///
    /// When the second side confirms, the settlement postings and the PAID
    /// status commit atomically with the acknowledgment.
    pub async fn acknowledge(
        &self,
        bill_id: BillId,
        actor_id: UserId,
    ) -> Result<AcknowledgeEffect, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut bill = lock_bill(&mut tx, bill_id).await?;
        let role = bill.role_of(actor_id);
        let now = Utc::now();

        let effect = bill.acknowledge(actor_id, now).map_err(RepositoryError::Bill)?;
        match effect {
            AcknowledgeEffect::AlreadyRecorded(_) => {
                tx.rollback().await?;
                return Ok(effect);
            }
            AcknowledgeEffect::Recorded(role) => {
                update_bill(&mut tx, &bill).await?;
                insert_action(
                    &mut tx,
                    &BillAction::by_member(bill_id, actor_id, ack_action(role)),
                )
                .await?;
            }
            AcknowledgeEffect::Settled => {
                let postings = bill.settlement_postings().map_err(RepositoryError::Bill)?;
                apply_entries(&mut tx, postings.to_vec()).await?;
                update_bill(&mut tx, &bill).await?;
                if let Some(role) = role {
                    insert_action(
                        &mut tx,
                        &BillAction::by_member(bill_id, actor_id, ack_action(role)),
                    )
                    .await?;
                }
                insert_action(&mut tx, &BillAction::by_system(bill_id, BillActionType::Settled))
                    .await?;
                info!(bill = %bill_id, "bill settled");
            }
        }

        tx.commit().await?;
        Ok(effect)
    }

    /// Raises a dispute on behalf of one of the bill's parties
    pub async fn dispute(
        &self,
        bill_id: BillId,
        actor_id: UserId,
        reason: &str,
    ) -> Result<Bill, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut bill = lock_bill(&mut tx, bill_id).await?;

        bill.dispute(actor_id, reason, Utc::now())
            .map_err(RepositoryError::Bill)?;
        update_bill(&mut tx, &bill).await?;
        insert_action(
            &mut tx,
            &BillAction::by_member(bill_id, actor_id, BillActionType::Disputed)
                .with_detail(reason),
        )
        .await?;

        tx.commit().await?;
        info!(bill = %bill_id, actor = %actor_id, "bill disputed");
        Ok(bill)
    }

    /// Applies an admin ruling to a disputed bill
    ///
    /// Verifies the actor holds the admin role in the bill's organization,
    /// then commits the status change, the outcome's ledger adjustments,
    /// and the audit action together.
    pub async fn resolve(
        &self,
        bill_id: BillId,
        admin_id: UserId,
        outcome: ResolutionOutcome,
        notes: &str,
    ) -> Result<Bill, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut bill = lock_bill(&mut tx, bill_id).await?;

        let role = sqlx::query_as::<_, (String,)>(
            "SELECT role FROM org_members WHERE org_id = $1 AND user_id = $2",
        )
        .bind(Uuid::from(bill.org_id))
        .bind(Uuid::from(admin_id))
        .fetch_optional(&mut *tx)
        .await?;
        if !matches!(role, Some((ref r,)) if r == "admin") {
            return Err(RepositoryError::NotAnAdmin {
                user_id: admin_id,
                org_id: bill.org_id,
            });
        }

        bill.resolve(outcome, notes, Utc::now())
            .map_err(RepositoryError::Bill)?;
        let adjustments = outcome.ledger_adjustments(&bill).map_err(RepositoryError::Bill)?;
        apply_entries(&mut tx, adjustments).await?;
        update_bill(&mut tx, &bill).await?;
        insert_action(
            &mut tx,
            &BillAction::by_member(bill_id, admin_id, BillActionType::Resolved)
                .with_detail(format!("{}: {}", outcome, notes)),
        )
        .await?;

        tx.commit().await?;
        info!(bill = %bill_id, outcome = %outcome, "dispute resolved");
        Ok(bill)
    }

    /// Counts a member's bills by viewer-relative category
    ///
    /// Covers one organization, or all of the member's organizations when
    /// `org_id` is None. History (settled and resolved) is always included.
    pub async fn split_summary(
        &self,
        user_id: UserId,
        org_id: Option<OrgId>,
    ) -> Result<BillSplitSummary, RepositoryError> {
        let rows = sqlx::query_as::<_, BillRow>(
            r#"
            SELECT * FROM bills
            WHERE (debtor_id = $1 OR creditor_id = $1)
              AND ($2::UUID IS NULL OR org_id = $2)
            "#,
        )
        .bind(Uuid::from(user_id))
        .bind(org_id.map(Uuid::from))
        .fetch_all(&self.pool)
        .await?;

        let bills: Vec<Bill> = rows
            .into_iter()
            .map(BillRow::into_domain)
            .collect::<Result<_, _>>()?;
        Ok(BillSplitSummary::tally(&bills, user_id))
    }

    /// Returns a bill's audit trail, oldest first
    pub async fn actions_for(&self, bill_id: BillId) -> Result<Vec<BillAction>, RepositoryError> {
        let rows = sqlx::query_as::<_, ActionRow>(
            r#"
            SELECT action_id, bill_id, actor_id, action, detail, created_at
            FROM bill_actions
            WHERE bill_id = $1
            ORDER BY created_at, action_id
            "#,
        )
        .bind(Uuid::from(bill_id))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ActionRow::into_domain).collect()
    }
}

fn ack_action(role: BillRole) -> BillActionType {
    match role {
        BillRole::Debtor => BillActionType::DebtorAcknowledged,
        BillRole::Creditor => BillActionType::CreditorAcknowledged,
    }
}

/// Fetches a bill with a row lock inside an open transaction
pub(crate) async fn lock_bill(
    tx: &mut Transaction<'_, Postgres>,
    bill_id: BillId,
) -> Result<Bill, RepositoryError> {
    let row = sqlx::query_as::<_, BillRow>("SELECT * FROM bills WHERE bill_id = $1 FOR UPDATE")
        .bind(Uuid::from(bill_id))
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Bill", bill_id))?;
    row.into_domain()
}

/// Inserts a freshly created bill and its `created` audit action
pub(crate) async fn insert_bill(
    tx: &mut Transaction<'_, Postgres>,
    bill: &Bill,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        INSERT INTO bills (
            bill_id, org_id, debtor_id, creditor_id, amount_minor, period,
            status, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(Uuid::from(bill.id))
    .bind(Uuid::from(bill.org_id))
    .bind(Uuid::from(bill.debtor_id))
    .bind(Uuid::from(bill.creditor_id))
    .bind(bill.amount.minor())
    .bind(bill.period.label())
    .bind(bill.status.as_str())
    .bind(bill.created_at)
    .bind(bill.updated_at)
    .execute(&mut **tx)
    .await?;

    insert_action(tx, &BillAction::by_system(bill.id, BillActionType::Created)).await
}

/// Writes a bill's mutable columns back after a lifecycle transition
async fn update_bill(
    tx: &mut Transaction<'_, Postgres>,
    bill: &Bill,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        UPDATE bills SET
            status = $2,
            debtor_acknowledged_at = $3,
            creditor_acknowledged_at = $4,
            disputed_at = $5,
            disputed_by = $6,
            dispute_reason = $7,
            resolved_at = $8,
            resolution_outcome = $9,
            resolution_notes = $10,
            updated_at = $11
        WHERE bill_id = $1
        "#,
    )
    .bind(Uuid::from(bill.id))
    .bind(bill.status.as_str())
    .bind(bill.debtor_acknowledged_at)
    .bind(bill.creditor_acknowledged_at)
    .bind(bill.disputed_at)
    .bind(bill.disputed_by.map(Uuid::from))
    .bind(bill.dispute_reason.as_deref())
    .bind(bill.resolved_at)
    .bind(bill.resolution_outcome.map(|o| o.as_str()))
    .bind(bill.resolution_notes.as_deref())
    .bind(bill.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_action(
    tx: &mut Transaction<'_, Postgres>,
    action: &BillAction,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        INSERT INTO bill_actions (action_id, bill_id, actor_id, action, detail, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(Uuid::from(action.id))
    .bind(Uuid::from(action.bill_id))
    .bind(action.actor_id.map(Uuid::from))
    .bind(action.action.as_str())
    .bind(action.detail.as_deref())
    .bind(action.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Reads the open (pending, disputed) obligations of an organization,
/// used by the netting run to offset already-billed debt
pub(crate) async fn open_obligations(
    tx: &mut Transaction<'_, Postgres>,
    org_id: OrgId,
) -> Result<Vec<OpenObligation>, RepositoryError> {
    let rows = sqlx::query_as::<_, (Uuid, Uuid, i64)>(
        r#"
        SELECT debtor_id, creditor_id, amount_minor FROM bills
        WHERE org_id = $1 AND status IN ('pending', 'disputed')
        "#,
    )
    .bind(Uuid::from(org_id))
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(debtor, creditor, amount)| OpenObligation {
            debtor_id: UserId::from(debtor),
            creditor_id: UserId::from(creditor),
            amount: Amount::from_minor(amount),
        })
        .collect())
}

/// Database row for a bill
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BillRow {
    pub bill_id: Uuid,
    pub org_id: Uuid,
    pub debtor_id: Uuid,
    pub creditor_id: Uuid,
    pub amount_minor: i64,
    pub period: String,
    pub status: String,
    pub debtor_acknowledged_at: Option<DateTime<Utc>>,
    pub creditor_acknowledged_at: Option<DateTime<Utc>>,
    pub disputed_at: Option<DateTime<Utc>>,
    pub disputed_by: Option<Uuid>,
    pub dispute_reason: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_outcome: Option<String>,
    pub resolution_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BillRow {
    /// Converts the row into the domain aggregate
    pub fn into_domain(self) -> Result<Bill, RepositoryError> {
        let status: BillStatus = self.status.parse().map_err(RepositoryError::Bill)?;
        let period: SettlementPeriod = self
            .period
            .parse()
            .map_err(|_| DatabaseError::CorruptValue(format!("period '{}'", self.period)))?;
        let resolution_outcome = self
            .resolution_outcome
            .map(|s| s.parse::<ResolutionOutcome>())
            .transpose()
            .map_err(RepositoryError::Bill)?;

        Ok(Bill {
            id: BillId::from(self.bill_id),
            org_id: OrgId::from(self.org_id),
            debtor_id: UserId::from(self.debtor_id),
            creditor_id: UserId::from(self.creditor_id),
            amount: Amount::from_minor(self.amount_minor),
            period,
            status,
            debtor_acknowledged_at: self.debtor_acknowledged_at,
            creditor_acknowledged_at: self.creditor_acknowledged_at,
            disputed_at: self.disputed_at,
            disputed_by: self.disputed_by.map(UserId::from),
            dispute_reason: self.dispute_reason,
            resolved_at: self.resolved_at,
            resolution_outcome,
            resolution_notes: self.resolution_notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Database row for a bill action
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActionRow {
    pub action_id: Uuid,
    pub bill_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActionRow {
    /// Converts the row into the domain action
    pub fn into_domain(self) -> Result<BillAction, RepositoryError> {
        let action: BillActionType = self.action.parse().map_err(RepositoryError::Bill)?;
        Ok(BillAction {
            id: BillActionId::from(self.action_id),
            bill_id: BillId::from(self.bill_id),
            actor_id: self.actor_id.map(UserId::from),
            action,
            detail: self.detail,
            created_at: self.created_at,
        })
    }
}
