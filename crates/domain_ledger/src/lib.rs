//! Ledger Domain - Append-Only Balance Tracking
//!
//! This crate implements the settlement core's ledger: an append-only log of
//! balance-affecting events and the authoritative running balance per
//! (user, organization) pair.
//!
//! # Principles
//!
//! - The balance is a derived fact: always reconstructible by summing the
//!   transaction log. The materialized balance is a cache, not a second
//!   source of truth.
//! - Transactions are immutable. Corrections are new transactions, never
//!   edits.
//! - Value moves between members in posting pairs (debit one member, credit
//!   another) that commit atomically.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{Ledger, RentalPostings};
//!
//! let mut ledger = Ledger::new();
//! let pair = RentalPostings::rental_completed(org, renter, owner, cost, rental_id)?;
//! ledger.record_pair(pair)?;
//! ```

pub mod error;
pub mod ledger;
pub mod transaction;

pub use error::LedgerError;
pub use ledger::Ledger;
pub use transaction::{LedgerEntry, LedgerTransaction, RentalPostings, TransactionType};
