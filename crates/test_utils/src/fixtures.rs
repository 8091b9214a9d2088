//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the settlement
//! system. These fixtures are designed to be consistent and predictable for
//! unit tests.

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::{Amount, BillId, OrgId, SettlementPeriod, UserId};
use domain_netting::MemberBalance;
use once_cell::sync::Lazy;
use uuid::Uuid;

/// Fixture for Amount test data
pub struct AmountFixtures;

impl AmountFixtures {
    /// The default netting threshold (5.00 in minor units)
    pub fn threshold() -> Amount {
        Amount::from_minor(500)
    }

    /// A small rental cost, below the netting threshold
    pub fn small_rental() -> Amount {
        Amount::from_minor(320)
    }

    /// A typical rental cost
    pub fn rental() -> Amount {
        Amount::from_minor(2500)
    }

    /// A large rental cost for settlement scenarios
    pub fn large_rental() -> Amount {
        Amount::from_minor(12_000)
    }

    /// An odd amount that does not split evenly in half
    pub fn odd() -> Amount {
        Amount::from_minor(8001)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// A fixed settlement period (June 2026)
    pub fn period() -> SettlementPeriod {
        SettlementPeriod::new(2026, 6).unwrap()
    }

    /// The period after [`Self::period`]
    pub fn next_period() -> SettlementPeriod {
        SettlementPeriod::new(2026, 7).unwrap()
    }

    /// A fixed timestamp inside [`Self::period`]
    pub fn mid_period() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    /// A timestamp shortly after [`Self::mid_period`]
    pub fn later() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 30, 0).unwrap()
    }
}

/// Fixture for identifier test data
///
/// Identifiers are derived from small integers so that failures print
/// recognizable values and ordering-sensitive tests are reproducible.
pub struct IdFixtures;

impl IdFixtures {
    /// A stable organization id
    pub fn org_id() -> OrgId {
        OrgId::from_uuid(Uuid::from_u128(0x0061))
    }

    /// A second organization id for isolation tests
    pub fn other_org_id() -> OrgId {
        OrgId::from_uuid(Uuid::from_u128(0x0062))
    }

    /// A stable user id derived from a small integer
    pub fn user_id(n: u32) -> UserId {
        UserId::from_uuid(Uuid::from_u128(n as u128))
    }

    /// A stable bill id derived from a small integer
    pub fn bill_id(n: u32) -> BillId {
        BillId::from_uuid(Uuid::from_u128(0xb000 + n as u128))
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    /// A rental posting description
    pub fn rental_description() -> &'static str {
        "Rental of cordless drill"
    }

    /// A dispute reason
    pub fn dispute_reason() -> &'static str {
        "The drill was returned with a cracked chuck"
    }

    /// Admin resolution notes
    pub fn resolution_notes() -> &'static str {
        "Reviewed photos from both parties; damage predates the rental"
    }
}

/// The ten-member tool library roster used by netting scenario tests
///
/// Balances sum to zero. Positive balances are creditors (the community
/// owes them), negative balances are debtors.
pub struct RosterFixtures;

impl RosterFixtures {
    pub fn john() -> UserId {
        IdFixtures::user_id(1)
    }
    pub fn mary() -> UserId {
        IdFixtures::user_id(2)
    }
    pub fn peter() -> UserId {
        IdFixtures::user_id(3)
    }
    pub fn sarah() -> UserId {
        IdFixtures::user_id(4)
    }
    pub fn david() -> UserId {
        IdFixtures::user_id(5)
    }
    pub fn emma() -> UserId {
        IdFixtures::user_id(6)
    }
    pub fn luke() -> UserId {
        IdFixtures::user_id(7)
    }
    pub fn anna() -> UserId {
        IdFixtures::user_id(8)
    }
    pub fn mark() -> UserId {
        IdFixtures::user_id(9)
    }
    pub fn ruth() -> UserId {
        IdFixtures::user_id(10)
    }

    /// Display names paired with user ids, in roster order
    pub fn names() -> Vec<(UserId, &'static str)> {
        vec![
            (Self::john(), "John"),
            (Self::mary(), "Mary"),
            (Self::peter(), "Peter"),
            (Self::sarah(), "Sarah"),
            (Self::david(), "David"),
            (Self::emma(), "Emma"),
            (Self::luke(), "Luke"),
            (Self::anna(), "Anna"),
            (Self::mark(), "Mark"),
            (Self::ruth(), "Ruth"),
        ]
    }

    /// The roster's month-end balance snapshot
    pub fn balances() -> Vec<MemberBalance> {
        ROSTER_BALANCES.clone()
    }

    /// The bills a netting run over [`Self::balances`] must propose, in order
    ///
    /// Tuples are (debtor, creditor, amount in minor units).
    pub fn expected_bills() -> Vec<(UserId, UserId, i64)> {
        vec![
            (Self::mary(), Self::john(), 3820),
            (Self::anna(), Self::luke(), 2500),
            (Self::sarah(), Self::peter(), 1275),
            (Self::anna(), Self::john(), 515),
        ]
    }
}

static ROSTER_BALANCES: Lazy<Vec<MemberBalance>> = Lazy::new(|| {
    vec![
        MemberBalance::new(RosterFixtures::john(), Amount::from_minor(4550)),
        MemberBalance::new(RosterFixtures::mary(), Amount::from_minor(-3820)),
        MemberBalance::new(RosterFixtures::peter(), Amount::from_minor(1275)),
        MemberBalance::new(RosterFixtures::sarah(), Amount::from_minor(-1560)),
        MemberBalance::new(RosterFixtures::david(), Amount::from_minor(320)),
        MemberBalance::new(RosterFixtures::emma(), Amount::from_minor(-280)),
        MemberBalance::new(RosterFixtures::luke(), Amount::from_minor(2500)),
        MemberBalance::new(RosterFixtures::anna(), Amount::from_minor(-3015)),
        MemberBalance::new(RosterFixtures::mark(), Amount::from_minor(450)),
        MemberBalance::new(RosterFixtures::ruth(), Amount::from_minor(-420)),
    ]
});
