//! Repository implementations

pub mod bills;
pub mod ledger;
pub mod netting;
