//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use core_kernel::{Amount, SettlementPeriod, UserId};
use domain_ledger::TransactionType;
use domain_netting::MemberBalance;
use proptest::prelude::*;
use uuid::Uuid;

/// Strategy for generating valid positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating signed amounts in minor units (never zero)
pub fn nonzero_amount_minor_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![
        -1_000_000_000i64..-1i64,
        1i64..1_000_000_000i64,
    ]
}

/// Strategy for generating positive Amount values
pub fn positive_amount_strategy() -> impl Strategy<Value = Amount> {
    positive_amount_minor_strategy().prop_map(Amount::from_minor)
}

/// Strategy for generating valid TransactionType values
pub fn transaction_type_strategy() -> impl Strategy<Value = TransactionType> {
    prop_oneof![
        Just(TransactionType::LendingCredit),
        Just(TransactionType::LendingDebit),
        Just(TransactionType::SettlementCredit),
        Just(TransactionType::SettlementDebit),
        Just(TransactionType::DisputeAdjustment),
    ]
}

/// Strategy for generating valid settlement periods
pub fn period_strategy() -> impl Strategy<Value = SettlementPeriod> {
    (2020i32..2040i32, 1u32..=12u32)
        .prop_map(|(year, month)| SettlementPeriod::new(year, month).unwrap())
}

/// Strategy for generating user ids from a small pool
///
/// A bounded pool makes collisions likely, which exercises tie-break and
/// aggregation paths that fully random ids would never hit.
pub fn user_id_strategy(pool_size: u32) -> impl Strategy<Value = UserId> {
    (1u32..=pool_size).prop_map(|n| UserId::from_uuid(Uuid::from_u128(n as u128)))
}

/// Strategy for generating a zero-sum balance snapshot
///
/// Balances are produced by applying random pairwise transfers to a flat
/// roster, so the snapshot is reachable from real lending activity and
/// always sums to zero.
pub fn zero_sum_snapshot_strategy(
    members: usize,
    transfers: usize,
) -> impl Strategy<Value = Vec<MemberBalance>> {
    let member_count = members.max(2);
    prop::collection::vec(
        (0..member_count, 0..member_count, 1i64..100_000i64),
        0..transfers,
    )
    .prop_map(move |moves| {
        let mut balances = vec![0i64; member_count];
        for (from, to, amount) in moves {
            if from == to {
                continue;
            }
            balances[from] -= amount;
            balances[to] += amount;
        }
        balances
            .into_iter()
            .enumerate()
            .map(|(i, minor)| {
                MemberBalance::new(
                    UserId::from_uuid(Uuid::from_u128(i as u128 + 1)),
                    Amount::from_minor(minor),
                )
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_positive_amounts_are_positive(amount in positive_amount_strategy()) {
            prop_assert!(amount.is_positive());
        }

        #[test]
        fn test_snapshots_are_zero_sum(snapshot in zero_sum_snapshot_strategy(8, 40)) {
            let total: i64 = snapshot.iter().map(|m| m.balance.minor()).sum();
            prop_assert_eq!(total, 0);
        }

        #[test]
        fn test_periods_roundtrip_labels(period in period_strategy()) {
            let parsed: SettlementPeriod = period.label().parse().unwrap();
            prop_assert_eq!(parsed, period);
        }
    }
}
