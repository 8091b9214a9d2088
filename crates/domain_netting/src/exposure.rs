//! Open-bill exposure offsets
//!
//! A netting run must not re-bill debt that is already covered by an open
//! bill from an earlier period. Balances only move when a bill settles, so
//! between creation and settlement the raw balance still shows the full
//! debt. Before netting, the caller folds each open obligation into the
//! snapshot as if it had already settled; whatever remains is the debt the
//! new run may bill.

use serde::{Deserialize, Serialize};

use core_kernel::{Amount, UserId};

use crate::engine::MemberBalance;

/// An open (pending or disputed) bill still awaiting settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenObligation {
    /// Member who owes on the open bill
    pub debtor_id: UserId,
    /// Member who is owed on the open bill
    pub creditor_id: UserId,
    /// Open bill amount, positive
    pub amount: Amount,
}

/// Applies open-bill offsets to a balance snapshot
///
/// Each open obligation is treated as if settled: the debtor's balance rises
/// by the amount and the creditor's falls by it. Raw balances are not
/// touched; this produces the effective snapshot a netting run consumes.
/// Obligations naming members absent from the snapshot are ignored.
pub fn effective_balances(
    balances: &[MemberBalance],
    open_bills: &[OpenObligation],
) -> Vec<MemberBalance> {
    let mut effective: Vec<MemberBalance> = balances.to_vec();
    for bill in open_bills {
        for member in effective.iter_mut() {
            if member.user_id == bill.debtor_id {
                member.balance += bill.amount;
            } else if member.user_id == bill.creditor_id {
                member.balance -= bill.amount;
            }
        }
    }
    effective
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_bill_removes_covered_debt() {
        let debtor = UserId::new();
        let creditor = UserId::new();
        let balances = [
            MemberBalance::new(debtor, Amount::from_minor(-3000)),
            MemberBalance::new(creditor, Amount::from_minor(3000)),
        ];
        let open = [OpenObligation {
            debtor_id: debtor,
            creditor_id: creditor,
            amount: Amount::from_minor(3000),
        }];

        let effective = effective_balances(&balances, &open);
        assert!(effective.iter().all(|m| m.balance.is_zero()));
    }

    #[test]
    fn test_partial_coverage_leaves_new_debt() {
        let debtor = UserId::new();
        let creditor = UserId::new();
        let balances = [
            MemberBalance::new(debtor, Amount::from_minor(-5000)),
            MemberBalance::new(creditor, Amount::from_minor(5000)),
        ];
        let open = [OpenObligation {
            debtor_id: debtor,
            creditor_id: creditor,
            amount: Amount::from_minor(3000),
        }];

        let effective = effective_balances(&balances, &open);
        assert_eq!(effective[0].balance, Amount::from_minor(-2000));
        assert_eq!(effective[1].balance, Amount::from_minor(2000));
    }

    #[test]
    fn test_unknown_parties_ignored() {
        let member = UserId::new();
        let balances = [MemberBalance::new(member, Amount::from_minor(1000))];
        let open = [OpenObligation {
            debtor_id: UserId::new(),
            creditor_id: UserId::new(),
            amount: Amount::from_minor(400),
        }];

        let effective = effective_balances(&balances, &open);
        assert_eq!(effective[0].balance, Amount::from_minor(1000));
    }
}
