//! Netting Domain - Debt Simplification
//!
//! Once per settlement period, each organization's outstanding member
//! balances are collapsed into the smallest set of directed debtor to
//! creditor obligations that would zero them out. This crate holds the pure
//! algorithm: a deterministic greedy pairing of largest debtor against
//! largest creditor, bounded below by a settlement threshold so that
//! micro-debts roll forward instead of generating fee-sized transfers.

pub mod engine;
pub mod error;
pub mod exposure;

pub use engine::{
    net_balances, MemberBalance, NettingConfig, ProposedBill, DEFAULT_THRESHOLD_MINOR,
};
pub use error::NettingError;
pub use exposure::{effective_balances, OpenObligation};
