//! Tests for minor-unit amount arithmetic

use core_kernel::{Amount, AmountError};

#[test]
fn test_balances_sum_to_zero_in_closed_system() {
    // The reference roster from the settlement scenario: a closed system of
    // debts nets to zero.
    let balances = [4550, -3820, 1275, -1560, 320, -280, 2500, -3015, 450, -420];
    let total: Amount = balances.into_iter().map(Amount::from_minor).sum();
    assert!(total.is_zero());
}

#[test]
fn test_magnitude_and_sign_queries() {
    let debt = Amount::from_minor(-3015);
    assert!(debt.is_negative());
    assert_eq!(debt.magnitude(), 3015);
    assert_eq!(debt.abs(), Amount::from_minor(3015));
}

#[test]
fn test_min_picks_smaller() {
    let a = Amount::from_minor(515);
    let b = Amount::from_minor(730);
    assert_eq!(a.min(b), a);
}

#[test]
fn test_positive_constructor_enforces_bill_invariant() {
    assert!(matches!(
        Amount::positive(0),
        Err(AmountError::InvalidAmount(_))
    ));
    assert_eq!(Amount::positive(515).unwrap(), Amount::from_minor(515));
}

#[test]
fn test_checked_sub_detects_overflow() {
    let min = Amount::from_minor(i64::MIN);
    let one = Amount::from_minor(1);
    assert_eq!(min.checked_sub(&one), Err(AmountError::Overflow));
}

#[test]
fn test_json_round_trip_is_transparent() {
    let amount = Amount::from_minor(8000);
    let json = serde_json::to_string(&amount).unwrap();
    assert_eq!(json, "8000");
    let back: Amount = serde_json::from_str(&json).unwrap();
    assert_eq!(back, amount);
}
