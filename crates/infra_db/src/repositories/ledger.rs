//! Ledger repository implementation
//!
//! Persists the append-only transaction log and keeps the materialized
//! balance on `org_members` in lockstep. Every append locks the member's
//! balance row `FOR UPDATE`; posting pairs lock their two rows in
//! ascending user id order so concurrent pairs cannot deadlock.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use core_kernel::{Amount, LedgerTxId, OrgId, RentalId, UserId};
use domain_ledger::{LedgerEntry, LedgerError, LedgerTransaction, RentalPostings, TransactionType};

use crate::error::RepositoryError;

/// Repository for the append-only ledger
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a completed rental: debit the renter, credit the owner
    ///
    /// Both postings and both balance updates commit in one transaction.
    /// Returns the (debit, credit) transaction ids.
    pub async fn record_rental_completion(
        &self,
        org_id: OrgId,
        renter_id: UserId,
        owner_id: UserId,
        cost: Amount,
        rental_id: RentalId,
    ) -> Result<(LedgerTxId, LedgerTxId), RepositoryError> {
        let pair = RentalPostings::rental_completed(org_id, renter_id, owner_id, cost, rental_id)
            .map_err(RepositoryError::Ledger)?;

        let mut tx = self.pool.begin().await?;
        let ids = apply_entries(&mut tx, pair.to_vec()).await?;
        tx.commit().await?;

        debug!(
            org = %org_id,
            renter = %renter_id,
            owner = %owner_id,
            cost = cost.minor(),
            "rental completion posted"
        );
        Ok((ids[0], ids[1]))
    }

    /// Returns the current balance of a member within an organization
    pub async fn balance_of(
        &self,
        org_id: OrgId,
        user_id: UserId,
    ) -> Result<Amount, RepositoryError> {
        let row = sqlx::query_as::<_, (i64,)>(
            "SELECT balance_minor FROM org_members WHERE org_id = $1 AND user_id = $2",
        )
        .bind(Uuid::from(org_id))
        .bind(Uuid::from(user_id))
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotAMember { user_id, org_id })?;

        Ok(Amount::from_minor(row.0))
    }

    /// Returns a member's transaction history, oldest first
    pub async fn transactions_for(
        &self,
        org_id: OrgId,
        user_id: UserId,
    ) -> Result<Vec<LedgerTransaction>, RepositoryError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT tx_id, org_id, user_id, delta_minor, tx_type,
                   description, reference_id, created_at
            FROM ledger_transactions
            WHERE org_id = $1 AND user_id = $2
            ORDER BY created_at, tx_id
            "#,
        )
        .bind(Uuid::from(org_id))
        .bind(Uuid::from(user_id))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TransactionRow::into_domain).collect()
    }

    /// Recomputes a member's balance from the transaction log
    ///
    /// Audit helper: the result must always equal `balance_of`.
    pub async fn recompute_balance(
        &self,
        org_id: OrgId,
        user_id: UserId,
    ) -> Result<Amount, RepositoryError> {
        let row = sqlx::query_as::<_, (i64,)>(
            r#"
            SELECT COALESCE(SUM(delta_minor), 0)::BIGINT
            FROM ledger_transactions
            WHERE org_id = $1 AND user_id = $2
            "#,
        )
        .bind(Uuid::from(org_id))
        .bind(Uuid::from(user_id))
        .fetch_one(&self.pool)
        .await?;

        Ok(Amount::from_minor(row.0))
    }

    /// Checks that the user holds the admin role in the organization
    pub async fn is_admin(&self, org_id: OrgId, user_id: UserId) -> Result<bool, RepositoryError> {
        let row = sqlx::query_as::<_, (String,)>(
            "SELECT role FROM org_members WHERE org_id = $1 AND user_id = $2",
        )
        .bind(Uuid::from(org_id))
        .bind(Uuid::from(user_id))
        .fetch_optional(&self.pool)
        .await?;

        Ok(matches!(row, Some((role,)) if role == "admin"))
    }

    /// Checks that the user is a member of the organization
    pub async fn is_member(&self, org_id: OrgId, user_id: UserId) -> Result<bool, RepositoryError> {
        let row = sqlx::query_as::<_, (i32,)>(
            "SELECT 1 FROM org_members WHERE org_id = $1 AND user_id = $2",
        )
        .bind(Uuid::from(org_id))
        .bind(Uuid::from(user_id))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }
}

/// Applies one ledger entry inside an open transaction
///
/// Locks the member's balance row, verifies the member exists, checks the
/// delta for overflow, updates the materialized balance, and appends the
/// transaction row.
pub(crate) async fn apply_entry(
    tx: &mut Transaction<'_, Postgres>,
    entry: &LedgerEntry,
) -> Result<LedgerTxId, RepositoryError> {
    let row = sqlx::query_as::<_, (i64,)>(
        "SELECT balance_minor FROM org_members WHERE org_id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(Uuid::from(entry.org_id))
    .bind(Uuid::from(entry.user_id))
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(RepositoryError::NotAMember {
        user_id: entry.user_id,
        org_id: entry.org_id,
    })?;

    let updated = Amount::from_minor(row.0)
        .checked_add(&entry.delta)
        .map_err(LedgerError::from)?;

    sqlx::query("UPDATE org_members SET balance_minor = $3 WHERE org_id = $1 AND user_id = $2")
        .bind(Uuid::from(entry.org_id))
        .bind(Uuid::from(entry.user_id))
        .bind(updated.minor())
        .execute(&mut **tx)
        .await?;

    let record = LedgerTransaction::from_entry(entry.clone(), Utc::now());
    sqlx::query(
        r#"
        INSERT INTO ledger_transactions (
            tx_id, org_id, user_id, delta_minor, tx_type,
            description, reference_id, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(Uuid::from(record.id))
    .bind(Uuid::from(record.org_id))
    .bind(Uuid::from(record.user_id))
    .bind(record.delta.minor())
    .bind(record.tx_type.as_str())
    .bind(&record.description)
    .bind(record.reference_id)
    .bind(record.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(record.id)
}

/// Applies a set of entries, locking member rows in ascending user id order
///
/// Returns the transaction ids in the same order as the input entries.
pub(crate) async fn apply_entries(
    tx: &mut Transaction<'_, Postgres>,
    entries: Vec<LedgerEntry>,
) -> Result<Vec<LedgerTxId>, RepositoryError> {
    let mut indexed: Vec<(usize, LedgerEntry)> = entries.into_iter().enumerate().collect();
    indexed.sort_by_key(|(_, e)| e.user_id);

    let mut ids: Vec<Option<LedgerTxId>> = vec![None; indexed.len()];
    for (position, entry) in &indexed {
        ids[*position] = Some(apply_entry(tx, entry).await?);
    }
    Ok(ids.into_iter().flatten().collect())
}

/// Database row for a ledger transaction
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransactionRow {
    pub tx_id: Uuid,
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub delta_minor: i64,
    pub tx_type: String,
    pub description: String,
    pub reference_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TransactionRow {
    /// Converts the row into the domain transaction
    pub fn into_domain(self) -> Result<LedgerTransaction, RepositoryError> {
        let tx_type: TransactionType = self
            .tx_type
            .parse()
            .map_err(RepositoryError::Ledger)?;
        Ok(LedgerTransaction {
            id: LedgerTxId::from(self.tx_id),
            org_id: OrgId::from(self.org_id),
            user_id: UserId::from(self.user_id),
            delta: Amount::from_minor(self.delta_minor),
            tx_type,
            description: self.description,
            reference_id: self.reference_id,
            created_at: self.created_at,
        })
    }
}
