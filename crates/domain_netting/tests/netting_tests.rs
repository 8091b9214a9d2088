//! Comprehensive tests for domain_netting

use core_kernel::{Amount, SettlementPeriod, UserId};
use domain_netting::{
    effective_balances, net_balances, MemberBalance, NettingConfig, OpenObligation, ProposedBill,
};
use uuid::Uuid;

fn period() -> SettlementPeriod {
    SettlementPeriod::new(2026, 8).unwrap()
}

/// Stable user id so tie-breaks and expectations are reproducible
fn user(n: u32) -> UserId {
    UserId::from_uuid(Uuid::from_u128(n as u128))
}

fn member(n: u32, minor: i64) -> MemberBalance {
    MemberBalance::new(user(n), Amount::from_minor(minor))
}

mod reference_scenario {
    use super::*;

    /// Ten-member roster used throughout the test suite
    ///
    /// John +4550, Mary -3820, Peter +1275, Sarah -1560, David +320,
    /// Emma -280, Luke +2500, Anna -3015, Mark +450, Ruth -420.
    fn roster() -> Vec<MemberBalance> {
        vec![
            member(1, 4550),  // John
            member(2, -3820), // Mary
            member(3, 1275),  // Peter
            member(4, -1560), // Sarah
            member(5, 320),   // David
            member(6, -280),  // Emma
            member(7, 2500),  // Luke
            member(8, -3015), // Anna
            member(9, 450),   // Mark
            member(10, -420), // Ruth
        ]
    }

    #[test]
    fn test_ten_member_roster_nets_to_four_bills() {
        let bills = net_balances(&roster(), period(), &NettingConfig::default()).unwrap();

        let expected = [
            (user(2), user(1), 3820), // Mary -> John
            (user(8), user(7), 2500), // Anna -> Luke
            (user(4), user(3), 1275), // Sarah -> Peter
            (user(8), user(1), 515),  // Anna -> John
        ];

        assert_eq!(bills.len(), 4);
        for (bill, (debtor, creditor, amount)) in bills.iter().zip(expected) {
            assert_eq!(bill.debtor_id, debtor);
            assert_eq!(bill.creditor_id, creditor);
            assert_eq!(bill.amount, Amount::from_minor(amount));
            assert_eq!(bill.period, period());
        }
    }

    #[test]
    fn test_roster_residuals_stay_unbilled() {
        let bills = net_balances(&roster(), period(), &NettingConfig::default()).unwrap();

        // Ruth, Emma, and Sarah's 285 residual never reach the threshold,
        // and the creditors' residuals are stranded once no qualifying
        // debtor remains.
        let billed_from_sarah: i64 = bills
            .iter()
            .filter(|b| b.debtor_id == user(4))
            .map(|b| b.amount.minor())
            .sum();
        assert_eq!(billed_from_sarah, 1275);
        assert!(bills.iter().all(|b| b.debtor_id != user(6)));
        assert!(bills.iter().all(|b| b.debtor_id != user(10)));
    }

    #[test]
    fn test_netting_is_deterministic() {
        let first = net_balances(&roster(), period(), &NettingConfig::default()).unwrap();
        let second = net_balances(&roster(), period(), &NettingConfig::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_snapshot_order_does_not_matter() {
        let mut reversed = roster();
        reversed.reverse();
        let canonical = net_balances(&roster(), period(), &NettingConfig::default()).unwrap();
        let shuffled = net_balances(&reversed, period(), &NettingConfig::default()).unwrap();
        assert_eq!(canonical, shuffled);
    }
}

mod structural_properties {
    use super::*;

    fn check(balances: &[MemberBalance], config: &NettingConfig) -> Vec<ProposedBill> {
        let bills = net_balances(balances, period(), config).unwrap();

        for bill in &bills {
            assert!(bill.amount >= config.threshold);
            assert_ne!(bill.debtor_id, bill.creditor_id);
        }

        // Conservation: no debtor is billed more than their debt and no
        // creditor receives more than their credit.
        for m in balances {
            let billed_out: i64 = bills
                .iter()
                .filter(|b| b.debtor_id == m.user_id)
                .map(|b| b.amount.minor())
                .sum();
            let billed_in: i64 = bills
                .iter()
                .filter(|b| b.creditor_id == m.user_id)
                .map(|b| b.amount.minor())
                .sum();
            assert!(billed_out <= m.balance.abs().minor());
            assert!(billed_in <= m.balance.abs().minor());
        }

        // Minimality bound: at most debtors + creditors - 1 bills.
        let debtors = balances.iter().filter(|m| m.balance.is_negative()).count();
        let creditors = balances.iter().filter(|m| m.balance.is_positive()).count();
        if debtors > 0 && creditors > 0 {
            assert!(bills.len() <= debtors + creditors - 1);
        }

        bills
    }

    #[test]
    fn test_one_debtor_many_creditors() {
        let bills = check(
            &[
                member(1, -6000),
                member(2, 3500),
                member(3, 1500),
                member(4, 1000),
            ],
            &NettingConfig::default(),
        );
        assert_eq!(bills.len(), 3);
        let total: i64 = bills.iter().map(|b| b.amount.minor()).sum();
        assert_eq!(total, 6000);
    }

    #[test]
    fn test_threshold_stops_matching_midway() {
        // After the first pairing the debtor's remainder is 300, below the
        // threshold, so the second creditor is left stranded.
        let bills = check(
            &[member(1, -1300), member(2, 1000), member(3, 300)],
            &NettingConfig::default(),
        );
        assert_eq!(bills.len(), 1);
        assert_eq!(bills[0].amount, Amount::from_minor(1000));
    }

    #[test]
    fn test_custom_threshold() {
        let config = NettingConfig::new(Amount::from_minor(100)).unwrap();
        let bills = check(&[member(1, -150), member(2, 150)], &config);
        assert_eq!(bills.len(), 1);
    }
}

mod exposure_offsets {
    use super::*;

    #[test]
    fn test_second_run_with_open_bills_produces_nothing_new() {
        let balances = [member(1, -2000), member(2, 2000)];
        let first = net_balances(&balances, period(), &NettingConfig::default()).unwrap();
        assert_eq!(first.len(), 1);

        // Nothing settled before the next run: folding the open bill in
        // leaves no effective debt to bill again.
        let open: Vec<OpenObligation> = first
            .iter()
            .map(|b| OpenObligation {
                debtor_id: b.debtor_id,
                creditor_id: b.creditor_id,
                amount: b.amount,
            })
            .collect();
        let effective = effective_balances(&balances, &open);
        let second = net_balances(&effective, period(), &NettingConfig::default()).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn test_new_debt_on_top_of_open_bill_is_billed() {
        // Original -2000 covered by an open bill, then 800 of fresh debt.
        let balances = [member(1, -2800), member(2, 2800)];
        let open = [OpenObligation {
            debtor_id: user(1),
            creditor_id: user(2),
            amount: Amount::from_minor(2000),
        }];

        let effective = effective_balances(&balances, &open);
        let bills = net_balances(&effective, period(), &NettingConfig::default()).unwrap();
        assert_eq!(bills.len(), 1);
        assert_eq!(bills[0].amount, Amount::from_minor(800));
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    /// Zero-sum balance sets: pairwise transfers between members, which is
    /// exactly how the ledger produces balances.
    fn zero_sum_balances() -> impl Strategy<Value = Vec<MemberBalance>> {
        (2usize..8, proptest::collection::vec((0usize..8, 0usize..8, 1i64..20_000), 1..30))
            .prop_map(|(members, transfers)| {
                let mut balances: Vec<i64> = vec![0; members];
                for (from, to, amount) in transfers {
                    let from = from % members;
                    let to = to % members;
                    if from != to {
                        balances[from] -= amount;
                        balances[to] += amount;
                    }
                }
                balances
                    .into_iter()
                    .enumerate()
                    .map(|(i, b)| member(i as u32 + 1, b))
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn all_bills_meet_threshold(balances in zero_sum_balances()) {
            let config = NettingConfig::default();
            let bills = net_balances(&balances, period(), &config).unwrap();
            prop_assert!(bills.iter().all(|b| b.amount >= config.threshold));
        }

        #[test]
        fn no_party_over_billed(balances in zero_sum_balances()) {
            let bills = net_balances(&balances, period(), &NettingConfig::default()).unwrap();
            for m in &balances {
                let out: i64 = bills.iter()
                    .filter(|b| b.debtor_id == m.user_id)
                    .map(|b| b.amount.minor())
                    .sum();
                let inn: i64 = bills.iter()
                    .filter(|b| b.creditor_id == m.user_id)
                    .map(|b| b.amount.minor())
                    .sum();
                prop_assert!(out <= m.balance.abs().minor());
                prop_assert!(inn <= m.balance.abs().minor());
            }
        }

        #[test]
        fn bill_count_bounded_by_party_count(balances in zero_sum_balances()) {
            let bills = net_balances(&balances, period(), &NettingConfig::default()).unwrap();
            let parties = balances.iter().filter(|m| !m.balance.is_zero()).count();
            prop_assert!(bills.len() <= parties.saturating_sub(1));
        }

        #[test]
        fn deterministic_over_shuffles(balances in zero_sum_balances()) {
            let mut reversed = balances.clone();
            reversed.reverse();
            let a = net_balances(&balances, period(), &NettingConfig::default()).unwrap();
            let b = net_balances(&reversed, period(), &NettingConfig::default()).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
