//! Netting domain errors

use core_kernel::Amount;
use thiserror::Error;

/// Errors that can occur while configuring or running a netting pass
#[derive(Debug, Error)]
pub enum NettingError {
    /// The settlement threshold must be strictly positive
    #[error("Settlement threshold must be positive, got {0}")]
    InvalidThreshold(Amount),

    /// The same member appeared more than once in the balance snapshot
    #[error("Duplicate member in balance snapshot: {0}")]
    DuplicateMember(core_kernel::UserId),
}
