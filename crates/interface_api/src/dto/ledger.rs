//! Ledger and rental collaborator DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_ledger::LedgerTransaction;

/// Query selecting one organization
#[derive(Debug, Deserialize)]
pub struct OrgQuery {
    pub org: Uuid,
}

/// Query with an optional organization filter
#[derive(Debug, Deserialize)]
pub struct OptionalOrgQuery {
    pub org: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub balance_minor: i64,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub delta_minor: i64,
    pub tx_type: String,
    pub description: String,
    pub reference_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<LedgerTransaction> for TransactionResponse {
    fn from(tx: LedgerTransaction) -> Self {
        Self {
            id: Uuid::from(tx.id),
            delta_minor: tx.delta.minor(),
            tx_type: tx.tx_type.to_string(),
            description: tx.description,
            reference_id: tx.reference_id,
            created_at: tx.created_at,
        }
    }
}

/// Rental collaborator callback: a rental completed at the agreed cost
#[derive(Debug, Deserialize, Validate)]
pub struct RentalCompletedRequest {
    pub org: Uuid,
    pub renter: Uuid,
    pub owner: Uuid,
    #[validate(range(min = 1))]
    pub cost_minor: i64,
    pub rental_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct RentalCompletedResponse {
    pub debit_tx_id: Uuid,
    pub credit_tx_id: Uuid,
}
