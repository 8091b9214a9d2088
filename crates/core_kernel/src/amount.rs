//! Monetary amounts in minor currency units
//!
//! All balances, obligations, and ledger deltas in the settlement core are
//! signed integers of minor units (cents). Integer arithmetic keeps the
//! ledger exact and makes the netting algorithm reproducible.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use thiserror::Error;

/// Errors that can occur during amount operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A signed monetary amount in minor currency units
///
/// Positive amounts are credits owed to a member; negative amounts are debts
/// the member owes. The zero point is a settled member.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// The zero amount
    pub const ZERO: Amount = Amount(0);

    /// Creates an amount from minor units (e.g., cents)
    pub const fn from_minor(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// Creates a strictly positive amount, rejecting zero and negatives
    ///
    /// Bill amounts must satisfy `amount > 0`; this is the constructor the
    /// bill lifecycle uses.
    pub fn positive(minor_units: i64) -> Result<Self, AmountError> {
        if minor_units <= 0 {
            return Err(AmountError::InvalidAmount(format!(
                "expected a positive amount, got {}",
                minor_units
            )));
        }
        Ok(Self(minor_units))
    }

    /// Returns the raw minor-unit value
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is strictly positive
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Returns true if the amount is strictly negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Returns the magnitude in minor units
    pub const fn magnitude(&self) -> i64 {
        self.0.abs()
    }

    /// Returns the smaller of two amounts
    pub fn min(self, other: Amount) -> Amount {
        Amount(self.0.min(other.0))
    }

    /// Checked addition
    pub fn checked_add(&self, other: &Amount) -> Result<Amount, AmountError> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or(AmountError::Overflow)
    }

    /// Checked subtraction
    pub fn checked_sub(&self, other: &Amount) -> Result<Amount, AmountError> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or(AmountError::Overflow)
    }

    /// Splits the amount in two halves with integer division
    ///
    /// The first half carries the remainder, so the two halves always sum to
    /// the original amount. Used for the both-at-fault dispute outcome, where
    /// the remainder is assigned to the debtor.
    pub const fn split_half(&self) -> (Amount, Amount) {
        let half = self.0 / 2;
        (Amount(self.0 - half), Amount(half))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, magnitude / 100, magnitude % 100)
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

impl From<i64> for Amount {
    fn from(minor_units: i64) -> Self {
        Self(minor_units)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> i64 {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_creation() {
        let a = Amount::from_minor(4550);
        assert_eq!(a.minor(), 4550);
        assert!(a.is_positive());
    }

    #[test]
    fn test_positive_rejects_zero_and_negative() {
        assert!(Amount::positive(0).is_err());
        assert!(Amount::positive(-100).is_err());
        assert_eq!(Amount::positive(500).unwrap().minor(), 500);
    }

    #[test]
    fn test_amount_arithmetic() {
        let a = Amount::from_minor(1000);
        let b = Amount::from_minor(-380);

        assert_eq!((a + b).minor(), 620);
        assert_eq!((a - b).minor(), 1380);
        assert_eq!((-a).minor(), -1000);
    }

    #[test]
    fn test_display_formats_minor_units() {
        assert_eq!(Amount::from_minor(4550).to_string(), "45.50");
        assert_eq!(Amount::from_minor(-3815).to_string(), "-38.15");
        assert_eq!(Amount::from_minor(5).to_string(), "0.05");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_split_half_remainder_to_first() {
        let (first, second) = Amount::from_minor(8001).split_half();
        assert_eq!(first.minor(), 4001);
        assert_eq!(second.minor(), 4000);
        assert_eq!(first + second, Amount::from_minor(8001));
    }

    #[test]
    fn test_checked_add_overflow() {
        let max = Amount::from_minor(i64::MAX);
        let one = Amount::from_minor(1);
        assert_eq!(max.checked_add(&one), Err(AmountError::Overflow));
    }

    #[test]
    fn test_sum() {
        let total: Amount = [100, -40, 25].into_iter().map(Amount::from_minor).sum();
        assert_eq!(total.minor(), 85);
    }
}
