//! End-to-end settlement workflows
//!
//! These tests exercise the full stack below the HTTP layer: rental
//! postings through the ledger repository, monthly netting runs, and the
//! two-party bill lifecycle, all against a containerized PostgreSQL.

use core_kernel::{Amount, OrgId, RentalId, SettlementPeriod, UserId};
use domain_bills::{AcknowledgeEffect, BillStatus, ResolutionOutcome};
use domain_netting::{NettingConfig, DEFAULT_THRESHOLD_MINOR};
use infra_db::{BillRepository, LedgerRepository, NettingRepository, RepositoryError};
use test_utils::{
    assert_zero_sum, create_isolated_test_database, IdFixtures, RosterFixtures, StringFixtures,
    TestDatabase,
};
use uuid::Uuid;

/// Seeds one organization with the ten-member roster and its balances
async fn seed_roster(db: &TestDatabase, org_id: OrgId) {
    db.seed_organization(*org_id.as_uuid(), "Maple Street Tool Library")
        .await
        .expect("seed organization");

    let balances = RosterFixtures::balances();
    for ((user_id, name), member) in RosterFixtures::names().iter().zip(&balances) {
        db.seed_user(*user_id.as_uuid(), name).await.expect("seed user");
        let role = if *user_id == RosterFixtures::john() {
            "admin"
        } else {
            "member"
        };
        db.seed_member(*org_id.as_uuid(), *user_id.as_uuid(), role, member.balance.minor())
            .await
            .expect("seed member");
    }
}

/// Seeds a minimal two-member organization
async fn seed_pair(db: &TestDatabase, org_id: OrgId, renter: UserId, owner: UserId) {
    db.seed_organization(*org_id.as_uuid(), "Elm Street Tool Library")
        .await
        .expect("seed organization");
    db.seed_user(*renter.as_uuid(), "Renter").await.expect("seed renter");
    db.seed_user(*owner.as_uuid(), "Owner").await.expect("seed owner");
    db.seed_member(*org_id.as_uuid(), *renter.as_uuid(), "member", 0)
        .await
        .expect("seed renter membership");
    db.seed_member(*org_id.as_uuid(), *owner.as_uuid(), "admin", 0)
        .await
        .expect("seed owner membership");
}

fn default_config() -> NettingConfig {
    NettingConfig::new(Amount::from_minor(DEFAULT_THRESHOLD_MINOR)).expect("valid threshold")
}

#[tokio::test]
async fn test_rental_completion_moves_balances_in_lockstep() {
    let db = create_isolated_test_database().await.expect("test database");
    let org_id = IdFixtures::org_id();
    let renter = IdFixtures::user_id(21);
    let owner = IdFixtures::user_id(22);
    seed_pair(&db, org_id, renter, owner).await;

    let ledger = LedgerRepository::new(db.pool().clone());
    let cost = Amount::from_minor(1250);
    let (debit_id, credit_id) = ledger
        .record_rental_completion(org_id, renter, owner, cost, RentalId::new())
        .await
        .expect("rental completion");
    assert_ne!(debit_id, credit_id);

    let renter_balance = ledger.balance_of(org_id, renter).await.expect("renter balance");
    let owner_balance = ledger.balance_of(org_id, owner).await.expect("owner balance");
    assert_eq!(renter_balance.minor(), -1250);
    assert_eq!(owner_balance.minor(), 1250);

    // The cached balance must agree with the replayed transaction log.
    let recomputed = ledger
        .recompute_balance(org_id, renter)
        .await
        .expect("recomputed balance");
    assert_eq!(recomputed, renter_balance);
}

#[tokio::test]
async fn test_rental_for_non_member_is_rejected_without_postings() {
    let db = create_isolated_test_database().await.expect("test database");
    let org_id = IdFixtures::org_id();
    let renter = IdFixtures::user_id(21);
    let owner = IdFixtures::user_id(22);
    seed_pair(&db, org_id, renter, owner).await;

    let ledger = LedgerRepository::new(db.pool().clone());
    let stranger = UserId::from_uuid(Uuid::new_v4());
    let result = ledger
        .record_rental_completion(org_id, stranger, owner, Amount::from_minor(500), RentalId::new())
        .await;
    assert!(matches!(result, Err(RepositoryError::NotAMember { .. })));

    // The owner's side must not have been applied either.
    let owner_balance = ledger.balance_of(org_id, owner).await.expect("owner balance");
    assert_eq!(owner_balance.minor(), 0);
}

#[tokio::test]
async fn test_netting_run_creates_expected_bills() {
    let db = create_isolated_test_database().await.expect("test database");
    let org_id = IdFixtures::org_id();
    seed_roster(&db, org_id).await;
    assert_zero_sum(&RosterFixtures::balances());

    let netting = NettingRepository::new(db.pool().clone());
    let period = SettlementPeriod::current();
    let report = netting
        .run_for_org(org_id, period, &default_config())
        .await
        .expect("netting run");

    assert_eq!(report.bills_created, 4);
    assert_eq!(report.total_amount.minor(), 3820 + 2500 + 1275 + 515);

    let bills = BillRepository::new(db.pool().clone());
    for (debtor, creditor, amount) in RosterFixtures::expected_bills() {
        let open = bills
            .list_for_member(org_id, debtor, false)
            .await
            .expect("list bills");
        assert!(
            open.iter().any(|b| b.debtor_id == debtor
                && b.creditor_id == creditor
                && b.amount.minor() == amount
                && b.status == BillStatus::Pending),
            "missing bill {} -> {} for {}",
            debtor,
            creditor,
            amount
        );
    }
}

#[tokio::test]
async fn test_rerun_with_open_bills_creates_nothing() {
    let db = create_isolated_test_database().await.expect("test database");
    let org_id = IdFixtures::org_id();
    seed_roster(&db, org_id).await;

    let netting = NettingRepository::new(db.pool().clone());
    let period = SettlementPeriod::current();
    let first = netting
        .run_for_org(org_id, period, &default_config())
        .await
        .expect("first run");
    assert_eq!(first.bills_created, 4);

    // Balances have not moved, but the open bills offset the snapshot.
    let second = netting
        .run_for_org(org_id, period, &default_config())
        .await
        .expect("second run");
    assert_eq!(second.bills_created, 0);
    assert_eq!(second.total_amount, Amount::ZERO);
}

#[tokio::test]
async fn test_two_acknowledgments_settle_and_post() {
    let db = create_isolated_test_database().await.expect("test database");
    let org_id = IdFixtures::org_id();
    seed_roster(&db, org_id).await;

    let netting = NettingRepository::new(db.pool().clone());
    netting
        .run_for_org(org_id, SettlementPeriod::current(), &default_config())
        .await
        .expect("netting run");

    let bills = BillRepository::new(db.pool().clone());
    let ledger = LedgerRepository::new(db.pool().clone());
    let mary = RosterFixtures::mary();
    let john = RosterFixtures::john();

    let bill = bills
        .list_for_member(org_id, mary, false)
        .await
        .expect("mary's bills")
        .into_iter()
        .find(|b| b.creditor_id == john)
        .expect("Mary owes John");
    assert_eq!(bill.amount.minor(), 3820);

    // First acknowledgment leaves the bill pending and balances untouched.
    let effect = bills.acknowledge(bill.id, mary).await.expect("debtor ack");
    assert!(matches!(effect, AcknowledgeEffect::Recorded(_)));
    assert_eq!(
        ledger.balance_of(org_id, mary).await.expect("balance").minor(),
        -3820
    );

    // Repeating the same side is a no-op.
    let repeat = bills.acknowledge(bill.id, mary).await.expect("repeat ack");
    assert!(matches!(repeat, AcknowledgeEffect::AlreadyRecorded(_)));

    // The second side settles the bill and commits the posting pair.
    let effect = bills.acknowledge(bill.id, john).await.expect("creditor ack");
    assert!(matches!(effect, AcknowledgeEffect::Settled));

    let settled = bills.find(bill.id).await.expect("settled bill");
    assert_eq!(settled.status, BillStatus::Paid);
    assert_eq!(
        ledger.balance_of(org_id, mary).await.expect("balance").minor(),
        0
    );
    assert_eq!(
        ledger.balance_of(org_id, john).await.expect("balance").minor(),
        4550 - 3820
    );
}

#[tokio::test]
async fn test_dispute_blocks_settlement_until_admin_resolves() {
    let db = create_isolated_test_database().await.expect("test database");
    let org_id = IdFixtures::org_id();
    seed_roster(&db, org_id).await;

    let netting = NettingRepository::new(db.pool().clone());
    netting
        .run_for_org(org_id, SettlementPeriod::current(), &default_config())
        .await
        .expect("netting run");

    let bills = BillRepository::new(db.pool().clone());
    let ledger = LedgerRepository::new(db.pool().clone());
    let sarah = RosterFixtures::sarah();
    let peter = RosterFixtures::peter();
    let john = RosterFixtures::john();

    let bill = bills
        .list_for_member(org_id, sarah, false)
        .await
        .expect("sarah's bills")
        .into_iter()
        .find(|b| b.creditor_id == peter)
        .expect("Sarah owes Peter");

    let disputed = bills
        .dispute(bill.id, sarah, StringFixtures::dispute_reason())
        .await
        .expect("dispute");
    assert_eq!(disputed.status, BillStatus::Disputed);

    // Acknowledgment of a disputed bill must fail.
    let blocked = bills.acknowledge(bill.id, peter).await;
    assert!(blocked.is_err());

    // A plain member cannot resolve.
    let denied = bills
        .resolve(
            bill.id,
            peter,
            ResolutionOutcome::DebtorAtFault,
            StringFixtures::resolution_notes(),
        )
        .await;
    assert!(matches!(denied, Err(RepositoryError::NotAnAdmin { .. })));

    // John holds the admin role; creditor-at-fault cancels the debt.
    let resolved = bills
        .resolve(
            bill.id,
            john,
            ResolutionOutcome::CreditorAtFault,
            StringFixtures::resolution_notes(),
        )
        .await
        .expect("resolution");
    assert_eq!(resolved.status, BillStatus::AdminResolved);

    assert_eq!(
        ledger.balance_of(org_id, sarah).await.expect("balance").minor(),
        -1560
    );
    assert_eq!(
        ledger.balance_of(org_id, peter).await.expect("balance").minor(),
        1275 - 1275
    );
}

#[tokio::test]
async fn test_bill_audit_trail_records_every_step() {
    let db = create_isolated_test_database().await.expect("test database");
    let org_id = IdFixtures::org_id();
    seed_roster(&db, org_id).await;

    let netting = NettingRepository::new(db.pool().clone());
    netting
        .run_for_org(org_id, SettlementPeriod::current(), &default_config())
        .await
        .expect("netting run");

    let bills = BillRepository::new(db.pool().clone());
    let mary = RosterFixtures::mary();
    let john = RosterFixtures::john();
    let bill = bills
        .list_for_member(org_id, mary, false)
        .await
        .expect("mary's bills")
        .into_iter()
        .find(|b| b.creditor_id == john)
        .expect("Mary owes John");

    bills.acknowledge(bill.id, mary).await.expect("debtor ack");
    bills.acknowledge(bill.id, john).await.expect("creditor ack");

    let actions = bills.actions_for(bill.id).await.expect("actions");
    let kinds: Vec<&str> = actions.iter().map(|a| a.action.as_str()).collect();
    assert_eq!(
        kinds,
        vec![
            "created",
            "debtor_acknowledged",
            "creditor_acknowledged",
            "settled"
        ]
    );
}

#[tokio::test]
async fn test_summary_reads_through_each_members_lens() {
    let db = create_isolated_test_database().await.expect("test database");
    let org_id = IdFixtures::org_id();
    seed_roster(&db, org_id).await;

    let netting = NettingRepository::new(db.pool().clone());
    netting
        .run_for_org(org_id, SettlementPeriod::current(), &default_config())
        .await
        .expect("netting run");

    let bills = BillRepository::new(db.pool().clone());
    let anna = RosterFixtures::anna();
    let john = RosterFixtures::john();

    // Anna owes on two bills; John is owed on two. Same bills, opposite lens.
    let anna_summary = bills
        .split_summary(anna, Some(org_id))
        .await
        .expect("anna's summary");
    assert_eq!(anna_summary.payment_to_make, 2);
    assert_eq!(anna_summary.receipt_to_verify, 0);
    assert_eq!(anna_summary.total(), 2);

    let john_summary = bills
        .split_summary(john, Some(org_id))
        .await
        .expect("john's summary");
    assert_eq!(john_summary.receipt_to_verify, 2);
    assert_eq!(john_summary.payment_to_make, 0);

    // Settling one bill moves it from open to history in both summaries.
    let bill = bills
        .list_for_member(org_id, anna, false)
        .await
        .expect("anna's bills")
        .into_iter()
        .find(|b| b.creditor_id == john)
        .expect("Anna owes John");
    bills.acknowledge(bill.id, anna).await.expect("debtor ack");
    bills.acknowledge(bill.id, john).await.expect("creditor ack");

    let anna_after = bills
        .split_summary(anna, Some(org_id))
        .await
        .expect("anna's summary after settling");
    assert_eq!(anna_after.payment_to_make, 1);
    assert_eq!(anna_after.payment_settled, 1);
    assert_eq!(anna_after.open_total(), 1);

    // A member with no bills gets an empty summary.
    let outsider = UserId::from_uuid(Uuid::new_v4());
    db.seed_random_user(*outsider.as_uuid())
        .await
        .expect("seed outsider");
    db.seed_member(*org_id.as_uuid(), *outsider.as_uuid(), "member", 0)
        .await
        .expect("seed outsider membership");
    let empty = bills
        .split_summary(outsider, Some(org_id))
        .await
        .expect("outsider summary");
    assert_eq!(empty.total(), 0);

    // Without an organization filter the summary spans all of them; Anna
    // belongs to one, so the counts agree.
    let cross = bills.split_summary(anna, None).await.expect("cross-org summary");
    assert_eq!(cross, anna_after);
}
