//! Request handlers

pub mod admin;
pub mod health;
pub mod ledger;
pub mod payments;
