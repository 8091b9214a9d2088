//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use core_kernel::{Amount, OrgId, SettlementPeriod, UserId};
use domain_bills::{Bill, BillStatus, ResolutionOutcome};
use domain_ledger::{LedgerEntry, TransactionType};
use domain_netting::MemberBalance;
use uuid::Uuid;

use crate::fixtures::{AmountFixtures, IdFixtures, StringFixtures, TemporalFixtures};

/// Builder for constructing test bills
pub struct TestBillBuilder {
    org_id: OrgId,
    debtor_id: UserId,
    creditor_id: UserId,
    amount: Amount,
    period: SettlementPeriod,
    status: BillStatus,
}

impl Default for TestBillBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBillBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            org_id: IdFixtures::org_id(),
            debtor_id: IdFixtures::user_id(1),
            creditor_id: IdFixtures::user_id(2),
            amount: AmountFixtures::rental(),
            period: TemporalFixtures::period(),
            status: BillStatus::Pending,
        }
    }

    /// Sets the organization
    pub fn with_org(mut self, org_id: OrgId) -> Self {
        self.org_id = org_id;
        self
    }

    /// Sets the debtor
    pub fn with_debtor(mut self, debtor_id: UserId) -> Self {
        self.debtor_id = debtor_id;
        self
    }

    /// Sets the creditor
    pub fn with_creditor(mut self, creditor_id: UserId) -> Self {
        self.creditor_id = creditor_id;
        self
    }

    /// Sets the amount in minor units
    pub fn with_amount_minor(mut self, minor: i64) -> Self {
        self.amount = Amount::from_minor(minor);
        self
    }

    /// Sets the settlement period
    pub fn with_period(mut self, period: SettlementPeriod) -> Self {
        self.period = period;
        self
    }

    /// Builds the bill, applying lifecycle steps to reach the requested status
    pub fn build(self) -> Bill {
        let mut bill = Bill::new(
            self.org_id,
            self.debtor_id,
            self.creditor_id,
            self.amount,
            self.period,
        )
        .expect("builder defaults produce a valid bill");

        match self.status {
            BillStatus::Pending => {}
            BillStatus::Paid => {
                bill.acknowledge(self.debtor_id, TemporalFixtures::mid_period())
                    .expect("debtor acknowledgment");
                bill.acknowledge(self.creditor_id, TemporalFixtures::later())
                    .expect("creditor acknowledgment");
            }
            BillStatus::Disputed => {
                bill.dispute(
                    self.debtor_id,
                    StringFixtures::dispute_reason(),
                    TemporalFixtures::mid_period(),
                )
                .expect("dispute");
            }
            BillStatus::AdminResolved => {
                bill.dispute(
                    self.debtor_id,
                    StringFixtures::dispute_reason(),
                    TemporalFixtures::mid_period(),
                )
                .expect("dispute");
                bill.resolve(
                    ResolutionOutcome::DebtorAtFault,
                    StringFixtures::resolution_notes(),
                    TemporalFixtures::later(),
                )
                .expect("resolution");
            }
        }
        bill
    }

    /// Builds a bill already disputed by its debtor
    pub fn build_disputed(mut self) -> Bill {
        self.status = BillStatus::Disputed;
        self.build()
    }

    /// Builds a bill settled by both acknowledgments
    pub fn build_paid(mut self) -> Bill {
        self.status = BillStatus::Paid;
        self.build()
    }
}

/// Builder for constructing test ledger entries
pub struct TestEntryBuilder {
    org_id: OrgId,
    user_id: UserId,
    delta: Amount,
    tx_type: TransactionType,
    description: String,
    reference_id: Option<Uuid>,
}

impl Default for TestEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEntryBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            org_id: IdFixtures::org_id(),
            user_id: IdFixtures::user_id(1),
            delta: AmountFixtures::rental(),
            tx_type: TransactionType::LendingCredit,
            description: StringFixtures::rental_description().to_string(),
            reference_id: None,
        }
    }

    /// Sets the organization
    pub fn with_org(mut self, org_id: OrgId) -> Self {
        self.org_id = org_id;
        self
    }

    /// Sets the affected member
    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = user_id;
        self
    }

    /// Sets the balance delta in minor units
    pub fn with_delta_minor(mut self, minor: i64) -> Self {
        self.delta = Amount::from_minor(minor);
        self
    }

    /// Sets the transaction type
    pub fn with_type(mut self, tx_type: TransactionType) -> Self {
        self.tx_type = tx_type;
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the originating event reference
    pub fn with_reference(mut self, reference_id: Uuid) -> Self {
        self.reference_id = Some(reference_id);
        self
    }

    /// Builds the entry
    pub fn build(self) -> LedgerEntry {
        let entry = LedgerEntry::new(
            self.org_id,
            self.user_id,
            self.delta,
            self.tx_type,
            self.description,
        )
        .expect("builder defaults produce a valid entry");
        match self.reference_id {
            Some(reference) => entry.with_reference(reference),
            None => entry,
        }
    }
}

/// Builder for constructing balance snapshots for netting tests
pub struct TestSnapshotBuilder {
    balances: Vec<MemberBalance>,
}

impl Default for TestSnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSnapshotBuilder {
    /// Creates an empty snapshot builder
    pub fn new() -> Self {
        Self { balances: Vec::new() }
    }

    /// Adds a member with a balance in minor units
    pub fn with_member(mut self, user_id: UserId, balance_minor: i64) -> Self {
        self.balances
            .push(MemberBalance::new(user_id, Amount::from_minor(balance_minor)));
        self
    }

    /// Builds the snapshot
    pub fn build(self) -> Vec<MemberBalance> {
        self.balances
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bill_builder_defaults_are_pending() {
        let bill = TestBillBuilder::new().build();
        assert_eq!(bill.status, BillStatus::Pending);
        assert!(bill.amount.is_positive());
        assert_ne!(bill.debtor_id, bill.creditor_id);
    }

    #[test]
    fn test_bill_builder_paid_records_both_acknowledgments() {
        let bill = TestBillBuilder::new().build_paid();
        assert_eq!(bill.status, BillStatus::Paid);
        assert!(bill.debtor_acknowledged_at.is_some());
        assert!(bill.creditor_acknowledged_at.is_some());
    }

    #[test]
    fn test_bill_builder_disputed_carries_reason() {
        let bill = TestBillBuilder::new().build_disputed();
        assert_eq!(bill.status, BillStatus::Disputed);
        assert!(bill.dispute_reason.is_some());
    }

    #[test]
    fn test_entry_builder_reference() {
        let reference = Uuid::new_v4();
        let entry = TestEntryBuilder::new().with_reference(reference).build();
        assert_eq!(entry.reference_id, Some(reference));
    }

    #[test]
    fn test_snapshot_builder_preserves_order() {
        let snapshot = TestSnapshotBuilder::new()
            .with_member(IdFixtures::user_id(1), 100)
            .with_member(IdFixtures::user_id(2), -100)
            .build();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].balance.minor(), 100);
    }
}
