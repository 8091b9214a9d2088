//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the settlement core, built on SQLx with
//! runtime-bound queries and the repository pattern. Each repository
//! executes domain transitions inside a single database transaction so
//! that a ledger append, a bill status change, and its audit action
//! commit together or not at all.
//!
//! Concurrency control:
//! - member balance rows are locked `FOR UPDATE`, in ascending user id
//!   order when a posting pair touches two members
//! - bill rows are locked `FOR UPDATE` for every lifecycle transition
//! - a netting run takes a per-organization advisory lock so two runs
//!   cannot read overlapping balance snapshots
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, LedgerRepository};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/settlement")).await?;
//! let ledger = LedgerRepository::new(pool);
//! ```

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::{DatabaseError, RepositoryError};
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use repositories::bills::BillRepository;
pub use repositories::ledger::LedgerRepository;
pub use repositories::netting::{NettingRepository, NettingRunReport};
