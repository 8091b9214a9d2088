//! Request/response data transfer objects

pub mod ledger;
pub mod payments;
