//! Ledger domain errors

use core_kernel::{Amount, AmountError, UserId};
use thiserror::Error;

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A transaction with a zero delta was submitted
    #[error("Ledger entry delta must be non-zero")]
    ZeroDelta,

    /// A transaction without a description was submitted
    #[error("Ledger entry description must not be blank")]
    BlankDescription,

    /// A rental cost must be strictly positive
    #[error("Rental cost must be positive, got {0}")]
    NonPositiveCost(Amount),

    /// A member cannot rent from themselves
    #[error("Renter and owner are the same member: {0}")]
    SelfRental(UserId),

    /// Unknown transaction type in storage
    #[error("Unknown transaction type: {0}")]
    UnknownTransactionType(String),

    /// Arithmetic error while applying a delta
    #[error("Amount error: {0}")]
    Amount(#[from] AmountError),
}
