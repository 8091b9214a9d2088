//! Append-only ledger implementation
//!
//! The ledger is the authoritative record of every balance-affecting event.
//! The balance of a (user, org) pair is derived: it is always the running sum
//! of that pair's transactions, with a materialized copy kept in lockstep for
//! reads.
//!
//! # Invariants
//!
//! - Transactions are append-only; none is ever updated or deleted
//! - `balance_of(user, org) == sum of all recorded deltas for (user, org)`
//! - A posting pair (e.g., rental completion) is applied fully or not at all

use chrono::Utc;
use std::collections::HashMap;
use tracing::debug;

use core_kernel::{Amount, LedgerTxId, OrgId, UserId};

use crate::error::LedgerError;
use crate::transaction::{LedgerEntry, LedgerTransaction};

/// In-memory ledger maintaining the transaction log and materialized balances
///
/// This is the reference semantics of the ledger component; the database
/// repository mirrors it with the same invariants under transactional
/// isolation.
#[derive(Debug, Default)]
pub struct Ledger {
    /// Append-only transaction log
    transactions: Vec<LedgerTransaction>,
    /// Materialized running balances, updated with every append
    balances: HashMap<(OrgId, UserId), Amount>,
}

impl Ledger {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one transaction and updates the affected balance
    ///
    /// # Errors
    ///
    /// Returns an error if applying the delta would overflow. The entry
    /// itself was validated at construction.
    pub fn record(&mut self, entry: LedgerEntry) -> Result<LedgerTxId, LedgerError> {
        let key = (entry.org_id, entry.user_id);
        let current = self.balances.get(&key).copied().unwrap_or(Amount::ZERO);
        let updated = current.checked_add(&entry.delta)?;

        let transaction = LedgerTransaction::from_entry(entry, Utc::now());
        let id = transaction.id;

        debug!(
            tx = %id,
            user = %transaction.user_id,
            org = %transaction.org_id,
            delta = transaction.delta.minor(),
            "ledger append"
        );

        self.balances.insert(key, updated);
        self.transactions.push(transaction);
        Ok(id)
    }

    /// Appends a posting pair atomically
    ///
    /// Both entries are validated against their current balances before
    /// either is applied, so a failure leaves the ledger untouched.
    pub fn record_pair(
        &mut self,
        entries: [LedgerEntry; 2],
    ) -> Result<(LedgerTxId, LedgerTxId), LedgerError> {
        for entry in &entries {
            let current = self
                .balances
                .get(&(entry.org_id, entry.user_id))
                .copied()
                .unwrap_or(Amount::ZERO);
            current.checked_add(&entry.delta)?;
        }
        let [first, second] = entries;
        let first_id = self.record(first)?;
        let second_id = self.record(second)?;
        Ok((first_id, second_id))
    }

    /// Returns the current balance of a member within an organization
    pub fn balance_of(&self, org_id: OrgId, user_id: UserId) -> Amount {
        self.balances
            .get(&(org_id, user_id))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Returns all transactions for a member within an organization,
    /// oldest first
    pub fn transactions_for(&self, org_id: OrgId, user_id: UserId) -> Vec<&LedgerTransaction> {
        self.transactions
            .iter()
            .filter(|t| t.org_id == org_id && t.user_id == user_id)
            .collect()
    }

    /// Recomputes a balance from the transaction log
    ///
    /// Used to audit the materialized balance; the two must always agree.
    pub fn recompute_balance(&self, org_id: OrgId, user_id: UserId) -> Amount {
        self.transactions
            .iter()
            .filter(|t| t.org_id == org_id && t.user_id == user_id)
            .map(|t| t.delta)
            .sum()
    }

    /// Verifies the materialized-balance invariant for every tracked pair
    pub fn is_consistent(&self) -> bool {
        self.balances
            .iter()
            .all(|(&(org, user), &balance)| self.recompute_balance(org, user) == balance)
    }

    /// Total number of recorded transactions
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Returns true if nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
