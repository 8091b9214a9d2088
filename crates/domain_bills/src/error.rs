//! Bill lifecycle errors

use core_kernel::{Amount, BillId, UserId};
use domain_ledger::LedgerError;
use thiserror::Error;

use crate::bill::BillStatus;

/// Errors that can occur in the bill lifecycle
#[derive(Debug, Error)]
pub enum BillError {
    /// The actor is neither the bill's debtor nor its creditor
    #[error("{user_id} is not a party to bill {bill_id}")]
    NotAParty { user_id: UserId, bill_id: BillId },

    /// The requested action is illegal from the bill's current status
    #[error("Cannot {action} a bill in status {from}")]
    InvalidTransition {
        from: BillStatus,
        action: &'static str,
    },

    /// A bill must carry a strictly positive amount
    #[error("Bill amount must be positive, got {0}")]
    NonPositiveAmount(Amount),

    /// Debtor and creditor must be different members
    #[error("Debtor and creditor are the same member: {0}")]
    SamePartyBill(UserId),

    /// A dispute must state a reason
    #[error("Dispute reason must not be blank")]
    BlankDisputeReason,

    /// A resolution must carry notes for the audit trail
    #[error("Resolution notes must not be blank")]
    BlankResolutionNotes,

    /// Unknown status text in storage
    #[error("Unknown bill status: {0}")]
    UnknownStatus(String),

    /// Unknown resolution outcome text in storage
    #[error("Unknown resolution outcome: {0}")]
    UnknownOutcome(String),

    /// Unknown action type text in storage
    #[error("Unknown bill action type: {0}")]
    UnknownActionType(String),

    /// Failure while building the settlement postings
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
