//! Bills Domain - Two-Party Settlement Lifecycle
//!
//! Money moves between members outside the system, through whatever payment
//! app they prefer. This crate therefore models promises and confirmations
//! rather than transfers: a bill created by a netting run stays PENDING
//! until both parties confirm, and only then does the ledger settle. A
//! contested bill is frozen in DISPUTED until an organization admin rules
//! on it with an explicit outcome.
//!
//! No single party can move a balance on their own. That two-man rule is
//! the central contract of this crate.

pub mod action;
pub mod bill;
pub mod category;
pub mod error;
pub mod resolution;

pub use action::{BillAction, BillActionType};
pub use bill::{AcknowledgeEffect, Bill, BillRole, BillStatus};
pub use category::{categorize, BillCategory, BillSplitSummary};
pub use error::BillError;
pub use resolution::ResolutionOutcome;
