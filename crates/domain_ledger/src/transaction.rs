//! Ledger transaction types
//!
//! This module defines the immutable transaction record, the write model used
//! to append one, and builders for the posting pairs the rest of the system
//! produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use core_kernel::{Amount, LedgerTxId, OrgId, RentalId, UserId};

use crate::error::LedgerError;

/// The business meaning of a ledger transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Credit accrued by lending out a tool (owner side of a rental)
    LendingCredit,
    /// Debit accrued by renting a tool (renter side of a rental)
    LendingDebit,
    /// Credit applied when a bill settles (creditor side)
    SettlementCredit,
    /// Debit applied when a bill settles (debtor side)
    SettlementDebit,
    /// Adjustment produced by an admin dispute resolution
    DisputeAdjustment,
}

impl TransactionType {
    /// Storage representation (text column in the transaction log)
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::LendingCredit => "lending_credit",
            TransactionType::LendingDebit => "lending_debit",
            TransactionType::SettlementCredit => "settlement_credit",
            TransactionType::SettlementDebit => "settlement_debit",
            TransactionType::DisputeAdjustment => "dispute_adjustment",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lending_credit" => Ok(TransactionType::LendingCredit),
            "lending_debit" => Ok(TransactionType::LendingDebit),
            "settlement_credit" => Ok(TransactionType::SettlementCredit),
            "settlement_debit" => Ok(TransactionType::SettlementDebit),
            "dispute_adjustment" => Ok(TransactionType::DisputeAdjustment),
            other => Err(LedgerError::UnknownTransactionType(other.to_string())),
        }
    }
}

/// Write model for appending one transaction to the ledger
///
/// The delta is signed: a debit is negative, a credit positive. A zero delta
/// is rejected because it would add noise to the audit log without affecting
/// any balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Organization the balance belongs to
    pub org_id: OrgId,
    /// Member whose balance moves
    pub user_id: UserId,
    /// Signed balance change in minor units
    pub delta: Amount,
    /// Business meaning of the change
    pub tx_type: TransactionType,
    /// Human-readable description for audit
    pub description: String,
    /// Originating event (rental id, bill id, ...)
    pub reference_id: Option<Uuid>,
}

impl LedgerEntry {
    /// Creates a new entry, validating the delta and description
    pub fn new(
        org_id: OrgId,
        user_id: UserId,
        delta: Amount,
        tx_type: TransactionType,
        description: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        if delta.is_zero() {
            return Err(LedgerError::ZeroDelta);
        }
        let description = description.into();
        if description.trim().is_empty() {
            return Err(LedgerError::BlankDescription);
        }
        Ok(Self {
            org_id,
            user_id,
            delta,
            tx_type,
            description,
            reference_id: None,
        })
    }

    /// Attaches the originating event reference
    pub fn with_reference(mut self, reference_id: Uuid) -> Self {
        self.reference_id = Some(reference_id);
        self
    }
}

/// An immutable, appended ledger transaction
///
/// Once recorded a transaction is never updated or deleted; the balance of a
/// (user, org) pair is the running sum of its transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// Unique transaction identifier
    pub id: LedgerTxId,
    /// Organization the balance belongs to
    pub org_id: OrgId,
    /// Member whose balance moved
    pub user_id: UserId,
    /// Signed balance change in minor units
    pub delta: Amount,
    /// Business meaning of the change
    pub tx_type: TransactionType,
    /// Human-readable description
    pub description: String,
    /// Originating event
    pub reference_id: Option<Uuid>,
    /// When the transaction was appended
    pub created_at: DateTime<Utc>,
}

impl LedgerTransaction {
    /// Materializes an entry into a recorded transaction
    pub fn from_entry(entry: LedgerEntry, at: DateTime<Utc>) -> Self {
        Self {
            id: LedgerTxId::new_v7(),
            org_id: entry.org_id,
            user_id: entry.user_id,
            delta: entry.delta,
            tx_type: entry.tx_type,
            description: entry.description,
            reference_id: entry.reference_id,
            created_at: at,
        }
    }
}

/// Builders for the posting pairs emitted by the rental collaborator
///
/// A completed rental moves the agreed cost from the renter to the owner:
/// both entries must be recorded in one atomic unit or not at all.
pub struct RentalPostings;

impl RentalPostings {
    /// Creates the debit/credit pair for a completed rental
    ///
    /// # Arguments
    ///
    /// * `org_id` - Organization the rental happened in
    /// * `renter_id` - Member who rented the tool (debited)
    /// * `owner_id` - Member who lent the tool (credited)
    /// * `cost` - Agreed rental cost, strictly positive
    /// * `rental_id` - Rental reference
    pub fn rental_completed(
        org_id: OrgId,
        renter_id: UserId,
        owner_id: UserId,
        cost: Amount,
        rental_id: RentalId,
    ) -> Result<[LedgerEntry; 2], LedgerError> {
        if !cost.is_positive() {
            return Err(LedgerError::NonPositiveCost(cost));
        }
        if renter_id == owner_id {
            return Err(LedgerError::SelfRental(renter_id));
        }
        let debit = LedgerEntry::new(
            org_id,
            renter_id,
            -cost,
            TransactionType::LendingDebit,
            "Rental completed",
        )?
        .with_reference(*rental_id.as_uuid());
        let credit = LedgerEntry::new(
            org_id,
            owner_id,
            cost,
            TransactionType::LendingCredit,
            "Rental completed",
        )?
        .with_reference(*rental_id.as_uuid());
        Ok([debit, credit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_round_trip() {
        for tx_type in [
            TransactionType::LendingCredit,
            TransactionType::LendingDebit,
            TransactionType::SettlementCredit,
            TransactionType::SettlementDebit,
            TransactionType::DisputeAdjustment,
        ] {
            let parsed: TransactionType = tx_type.as_str().parse().unwrap();
            assert_eq!(parsed, tx_type);
        }
    }

    #[test]
    fn test_unknown_transaction_type_rejected() {
        assert!("deposit_refund".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_entry_rejects_zero_delta() {
        let result = LedgerEntry::new(
            OrgId::new(),
            UserId::new(),
            Amount::ZERO,
            TransactionType::LendingCredit,
            "noop",
        );
        assert!(matches!(result, Err(LedgerError::ZeroDelta)));
    }

    #[test]
    fn test_entry_rejects_blank_description() {
        let result = LedgerEntry::new(
            OrgId::new(),
            UserId::new(),
            Amount::from_minor(100),
            TransactionType::LendingCredit,
            "   ",
        );
        assert!(matches!(result, Err(LedgerError::BlankDescription)));
    }

    #[test]
    fn test_rental_completed_pair_balances() {
        let [debit, credit] = RentalPostings::rental_completed(
            OrgId::new(),
            UserId::new(),
            UserId::new(),
            Amount::from_minor(2500),
            RentalId::new(),
        )
        .unwrap();

        assert_eq!(debit.delta + credit.delta, Amount::ZERO);
        assert_eq!(debit.tx_type, TransactionType::LendingDebit);
        assert_eq!(credit.tx_type, TransactionType::LendingCredit);
        assert_eq!(debit.reference_id, credit.reference_id);
    }

    #[test]
    fn test_rental_completed_rejects_self_rental() {
        let member = UserId::new();
        let result = RentalPostings::rental_completed(
            OrgId::new(),
            member,
            member,
            Amount::from_minor(100),
            RentalId::new(),
        );
        assert!(matches!(result, Err(LedgerError::SelfRental(_))));
    }
}
