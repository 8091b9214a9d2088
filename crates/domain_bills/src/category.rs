//! Per-viewer bill categorization and summaries
//!
//! The same bill reads differently to each party: the debtor sees a payment
//! to make, the creditor a receipt to verify. Listings present bills through
//! the viewer's lens, and the split summary counts one member's bills by
//! that same lens.

use serde::{Deserialize, Serialize};

use core_kernel::UserId;

use crate::bill::{Bill, BillRole, BillStatus};

/// How a bill appears to one of its parties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillCategory {
    /// Viewer owes and has not settled yet
    PaymentToMake,
    /// Viewer is owed and must verify receipt
    ReceiptToVerify,
    /// Viewer owes on a disputed bill
    PaymentInDispute,
    /// Viewer is owed on a disputed bill
    ReceiptInDispute,
    /// Viewer's side of a settled bill
    PaymentSettled,
    /// Viewer's side of a received settlement
    ReceiptSettled,
    /// Viewer owed on a bill closed by admin ruling
    PaymentResolved,
    /// Viewer was owed on a bill closed by admin ruling
    ReceiptResolved,
}

impl BillCategory {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BillCategory::PaymentToMake => "payment_to_make",
            BillCategory::ReceiptToVerify => "receipt_to_verify",
            BillCategory::PaymentInDispute => "payment_in_dispute",
            BillCategory::ReceiptInDispute => "receipt_in_dispute",
            BillCategory::PaymentSettled => "payment_settled",
            BillCategory::ReceiptSettled => "receipt_settled",
            BillCategory::PaymentResolved => "payment_resolved",
            BillCategory::ReceiptResolved => "receipt_resolved",
        }
    }

    /// Categories for bills still requiring attention
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            BillCategory::PaymentToMake
                | BillCategory::ReceiptToVerify
                | BillCategory::PaymentInDispute
                | BillCategory::ReceiptInDispute
        )
    }
}

/// Categorizes a bill from one member's point of view
///
/// Returns None when the viewer is not a party to the bill.
pub fn categorize(bill: &Bill, viewer: UserId) -> Option<BillCategory> {
    let role = bill.role_of(viewer)?;
    let category = match (role, bill.status) {
        (BillRole::Debtor, BillStatus::Pending) => BillCategory::PaymentToMake,
        (BillRole::Creditor, BillStatus::Pending) => BillCategory::ReceiptToVerify,
        (BillRole::Debtor, BillStatus::Disputed) => BillCategory::PaymentInDispute,
        (BillRole::Creditor, BillStatus::Disputed) => BillCategory::ReceiptInDispute,
        (BillRole::Debtor, BillStatus::Paid) => BillCategory::PaymentSettled,
        (BillRole::Creditor, BillStatus::Paid) => BillCategory::ReceiptSettled,
        (BillRole::Debtor, BillStatus::AdminResolved) => BillCategory::PaymentResolved,
        (BillRole::Creditor, BillStatus::AdminResolved) => BillCategory::ReceiptResolved,
    };
    Some(category)
}

/// Counts of one member's bills by viewer-relative category
///
/// Bills the viewer is not a party to are skipped, so the tally of an
/// organization's bills and the tally of a member's own listing agree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillSplitSummary {
    pub payment_to_make: u64,
    pub receipt_to_verify: u64,
    pub payment_in_dispute: u64,
    pub receipt_in_dispute: u64,
    pub payment_settled: u64,
    pub receipt_settled: u64,
    pub payment_resolved: u64,
    pub receipt_resolved: u64,
}

impl BillSplitSummary {
    /// Tallies a set of bills from one member's point of view
    pub fn tally<'a>(bills: impl IntoIterator<Item = &'a Bill>, viewer: UserId) -> Self {
        let mut summary = Self::default();
        for bill in bills {
            match categorize(bill, viewer) {
                Some(BillCategory::PaymentToMake) => summary.payment_to_make += 1,
                Some(BillCategory::ReceiptToVerify) => summary.receipt_to_verify += 1,
                Some(BillCategory::PaymentInDispute) => summary.payment_in_dispute += 1,
                Some(BillCategory::ReceiptInDispute) => summary.receipt_in_dispute += 1,
                Some(BillCategory::PaymentSettled) => summary.payment_settled += 1,
                Some(BillCategory::ReceiptSettled) => summary.receipt_settled += 1,
                Some(BillCategory::PaymentResolved) => summary.payment_resolved += 1,
                Some(BillCategory::ReceiptResolved) => summary.receipt_resolved += 1,
                None => {}
            }
        }
        summary
    }

    /// Total number of the viewer's bills counted
    pub fn total(&self) -> u64 {
        self.open_total()
            + self.payment_settled
            + self.receipt_settled
            + self.payment_resolved
            + self.receipt_resolved
    }

    /// Bills still requiring the viewer's attention
    pub fn open_total(&self) -> u64 {
        self.payment_to_make
            + self.receipt_to_verify
            + self.payment_in_dispute
            + self.receipt_in_dispute
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_kernel::{Amount, OrgId, SettlementPeriod};

    fn bill() -> Bill {
        Bill::new(
            OrgId::new(),
            UserId::new(),
            UserId::new(),
            Amount::from_minor(1000),
            SettlementPeriod::new(2026, 8).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_pending_bill_reads_per_role() {
        let bill = bill();
        assert_eq!(
            categorize(&bill, bill.debtor_id),
            Some(BillCategory::PaymentToMake)
        );
        assert_eq!(
            categorize(&bill, bill.creditor_id),
            Some(BillCategory::ReceiptToVerify)
        );
        assert_eq!(categorize(&bill, UserId::new()), None);
    }

    #[test]
    fn test_disputed_bill_categories() {
        let mut bill = bill();
        bill.dispute(bill.debtor_id, "contested", Utc::now()).unwrap();
        assert_eq!(
            categorize(&bill, bill.debtor_id),
            Some(BillCategory::PaymentInDispute)
        );
        assert_eq!(
            categorize(&bill, bill.creditor_id),
            Some(BillCategory::ReceiptInDispute)
        );
        assert!(categorize(&bill, bill.debtor_id).unwrap().is_open());
    }

    #[test]
    fn test_settled_bill_categories_are_history() {
        let mut bill = bill();
        bill.acknowledge(bill.debtor_id, Utc::now()).unwrap();
        bill.acknowledge(bill.creditor_id, Utc::now()).unwrap();
        let category = categorize(&bill, bill.debtor_id).unwrap();
        assert_eq!(category, BillCategory::PaymentSettled);
        assert!(!category.is_open());
    }

    fn bill_between(debtor: UserId, creditor: UserId) -> Bill {
        Bill::new(
            OrgId::new(),
            debtor,
            creditor,
            Amount::from_minor(1000),
            SettlementPeriod::new(2026, 8).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_summary_counts_by_viewer_category() {
        let me = UserId::new();
        let other = UserId::new();

        // I owe on one pending bill, am owed on another, and one of my
        // receivables is disputed.
        let owing = bill_between(me, other);
        let owed = bill_between(other, me);
        let mut disputed = bill_between(other, me);
        disputed
            .dispute(disputed.debtor_id, "wrong amount", Utc::now())
            .unwrap();
        let mut paid = bill_between(me, other);
        paid.acknowledge(paid.debtor_id, Utc::now()).unwrap();
        paid.acknowledge(paid.creditor_id, Utc::now()).unwrap();

        let summary = BillSplitSummary::tally([&owing, &owed, &disputed, &paid], me);
        assert_eq!(summary.payment_to_make, 1);
        assert_eq!(summary.receipt_to_verify, 1);
        assert_eq!(summary.receipt_in_dispute, 1);
        assert_eq!(summary.payment_settled, 1);
        assert_eq!(summary.open_total(), 3);
        assert_eq!(summary.total(), 4);

        // The same bills read mirrored from the other side.
        let mirrored = BillSplitSummary::tally([&owing, &owed, &disputed, &paid], other);
        assert_eq!(mirrored.receipt_to_verify, 1);
        assert_eq!(mirrored.payment_to_make, 1);
        assert_eq!(mirrored.payment_in_dispute, 1);
        assert_eq!(mirrored.receipt_settled, 1);
    }

    #[test]
    fn test_summary_skips_bills_of_other_members() {
        let outsider = UserId::new();
        let bills = [bill(), bill()];
        let summary = BillSplitSummary::tally(&bills, outsider);
        assert_eq!(summary.total(), 0);
    }
}
