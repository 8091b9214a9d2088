//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use core_kernel::{Amount, UserId};
use domain_bills::{Bill, BillStatus};
use domain_ledger::LedgerEntry;
use domain_netting::{MemberBalance, ProposedBill};

/// Asserts that a set of balances sums to zero
///
/// Every lending posting pair is zero-sum, so any complete balance snapshot
/// of a closed community must also be.
pub fn assert_zero_sum(balances: &[MemberBalance]) {
    let total: i64 = balances.iter().map(|m| m.balance.minor()).sum();
    assert_eq!(
        total, 0,
        "Balance snapshot is not zero-sum: off by {} minor units",
        total
    );
}

/// Asserts that a posting pair nets to zero
pub fn assert_entries_zero_sum(entries: &[LedgerEntry]) {
    let total: i64 = entries.iter().map(|e| e.delta.minor()).sum();
    assert_eq!(
        total, 0,
        "Posting set is not zero-sum: off by {} minor units",
        total
    );
}

/// Asserts that an amount is positive
pub fn assert_amount_positive(amount: Amount) {
    assert!(
        amount.is_positive(),
        "Expected positive amount, got {} minor units",
        amount.minor()
    );
}

/// Asserts a bill's current status
pub fn assert_bill_status(bill: &Bill, expected: BillStatus) {
    assert_eq!(
        bill.status, expected,
        "Bill {} has status {:?}, expected {:?}",
        bill.id, bill.status, expected
    );
}

/// Asserts that a proposal set contains an exact (debtor, creditor, amount) bill
pub fn assert_contains_bill(
    proposals: &[ProposedBill],
    debtor: UserId,
    creditor: UserId,
    amount_minor: i64,
) {
    let found = proposals.iter().any(|p| {
        p.debtor_id == debtor && p.creditor_id == creditor && p.amount.minor() == amount_minor
    });
    assert!(
        found,
        "No bill {} -> {} for {} minor units in {:?}",
        debtor, creditor, amount_minor, proposals
    );
}

/// Asserts that no member appears as both debtor and creditor in a proposal set
pub fn assert_no_self_bills(proposals: &[ProposedBill]) {
    for p in proposals {
        assert_ne!(
            p.debtor_id, p.creditor_id,
            "Proposal bills {} against themselves",
            p.debtor_id
        );
    }
}
