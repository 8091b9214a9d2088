//! Dispute resolution outcomes and their ledger effects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use domain_ledger::{LedgerEntry, TransactionType};

use crate::bill::Bill;
use crate::error::BillError;

/// An admin's ruling on a disputed bill
///
/// A closed enumeration so the settlement effect is an exhaustive match,
/// not a string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// The debtor never paid: settlement is enforced as if paid
    DebtorAtFault,
    /// The claim was false: the creditor is penalized by the amount
    CreditorAtFault,
    /// Shared blame: each party is debited half
    BothAtFault,
}

impl ResolutionOutcome {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionOutcome::DebtorAtFault => "debtor_at_fault",
            ResolutionOutcome::CreditorAtFault => "creditor_at_fault",
            ResolutionOutcome::BothAtFault => "both_at_fault",
        }
    }

    /// The ledger adjustments this ruling implies for a bill
    ///
    /// - `DebtorAtFault`: debtor debited the amount, creditor credited it,
    ///   the same movement a normal settlement performs
    /// - `CreditorAtFault`: creditor debited the amount, debtor untouched
    /// - `BothAtFault`: each party debited half, with the odd minor unit
    ///   assigned to the debtor so the split is deterministic
    pub fn ledger_adjustments(&self, bill: &Bill) -> Result<Vec<LedgerEntry>, BillError> {
        let reference = *bill.id.as_uuid();
        let description = format!("Dispute resolved: {}", self.as_str());

        let entries = match self {
            ResolutionOutcome::DebtorAtFault => vec![
                LedgerEntry::new(
                    bill.org_id,
                    bill.debtor_id,
                    -bill.amount,
                    TransactionType::DisputeAdjustment,
                    description.clone(),
                )?
                .with_reference(reference),
                LedgerEntry::new(
                    bill.org_id,
                    bill.creditor_id,
                    bill.amount,
                    TransactionType::DisputeAdjustment,
                    description,
                )?
                .with_reference(reference),
            ],
            ResolutionOutcome::CreditorAtFault => vec![LedgerEntry::new(
                bill.org_id,
                bill.creditor_id,
                -bill.amount,
                TransactionType::DisputeAdjustment,
                description,
            )?
            .with_reference(reference)],
            ResolutionOutcome::BothAtFault => {
                let (debtor_share, creditor_share) = bill.amount.split_half();
                let mut entries = vec![LedgerEntry::new(
                    bill.org_id,
                    bill.debtor_id,
                    -debtor_share,
                    TransactionType::DisputeAdjustment,
                    description.clone(),
                )?
                .with_reference(reference)];
                // A one-unit bill leaves the creditor's share empty; the
                // ledger rejects zero deltas, so no entry is emitted.
                if !creditor_share.is_zero() {
                    entries.push(
                        LedgerEntry::new(
                            bill.org_id,
                            bill.creditor_id,
                            -creditor_share,
                            TransactionType::DisputeAdjustment,
                            description,
                        )?
                        .with_reference(reference),
                    );
                }
                entries
            }
        };
        Ok(entries)
    }
}

impl fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResolutionOutcome {
    type Err = BillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debtor_at_fault" => Ok(ResolutionOutcome::DebtorAtFault),
            "creditor_at_fault" => Ok(ResolutionOutcome::CreditorAtFault),
            "both_at_fault" => Ok(ResolutionOutcome::BothAtFault),
            other => Err(BillError::UnknownOutcome(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Amount, OrgId, SettlementPeriod, UserId};

    fn bill(minor: i64) -> Bill {
        Bill::new(
            OrgId::new(),
            UserId::new(),
            UserId::new(),
            Amount::from_minor(minor),
            SettlementPeriod::new(2026, 8).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_debtor_at_fault_enforces_settlement() {
        let bill = bill(8000);
        let entries = ResolutionOutcome::DebtorAtFault
            .ledger_adjustments(&bill)
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].user_id, bill.debtor_id);
        assert_eq!(entries[0].delta, Amount::from_minor(-8000));
        assert_eq!(entries[1].user_id, bill.creditor_id);
        assert_eq!(entries[1].delta, Amount::from_minor(8000));
    }

    #[test]
    fn test_creditor_at_fault_penalizes_creditor_only() {
        let bill = bill(8000);
        let entries = ResolutionOutcome::CreditorAtFault
            .ledger_adjustments(&bill)
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, bill.creditor_id);
        assert_eq!(entries[0].delta, Amount::from_minor(-8000));
    }

    #[test]
    fn test_both_at_fault_splits_evenly() {
        let bill = bill(8000);
        let entries = ResolutionOutcome::BothAtFault
            .ledger_adjustments(&bill)
            .unwrap();
        assert_eq!(entries[0].delta, Amount::from_minor(-4000));
        assert_eq!(entries[1].delta, Amount::from_minor(-4000));
    }

    #[test]
    fn test_both_at_fault_odd_remainder_goes_to_debtor() {
        let bill = bill(8001);
        let entries = ResolutionOutcome::BothAtFault
            .ledger_adjustments(&bill)
            .unwrap();
        assert_eq!(entries[0].user_id, bill.debtor_id);
        assert_eq!(entries[0].delta, Amount::from_minor(-4001));
        assert_eq!(entries[1].delta, Amount::from_minor(-4000));
    }

    #[test]
    fn test_both_at_fault_one_unit_bill_charges_debtor_only() {
        let bill = bill(1);
        let entries = ResolutionOutcome::BothAtFault
            .ledger_adjustments(&bill)
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, bill.debtor_id);
        assert_eq!(entries[0].delta, Amount::from_minor(-1));
    }

    #[test]
    fn test_outcome_round_trip() {
        for outcome in [
            ResolutionOutcome::DebtorAtFault,
            ResolutionOutcome::CreditorAtFault,
            ResolutionOutcome::BothAtFault,
        ] {
            let parsed: ResolutionOutcome = outcome.as_str().parse().unwrap();
            assert_eq!(parsed, outcome);
        }
    }
}
