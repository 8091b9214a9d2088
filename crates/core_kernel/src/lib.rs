//! Core Kernel - Foundational types and utilities for the settlement system
//!
//! This crate provides the fundamental building blocks used across all domain
//! modules:
//! - Minor-unit monetary amounts with exact integer arithmetic
//! - Settlement periods (calendar months)
//! - Common identifiers and value objects

pub mod amount;
pub mod error;
pub mod identifiers;
pub mod period;

pub use amount::{Amount, AmountError};
pub use error::CoreError;
pub use identifiers::{BillActionId, BillId, LedgerTxId, OrgId, RentalId, UserId};
pub use period::{PeriodError, SettlementPeriod};
