//! Append-only bill action audit log
//!
//! Every lifecycle transition writes exactly one action so the full history
//! of a bill can be replayed. Actions are never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{BillActionId, BillId, UserId};

use crate::error::BillError;

/// What happened to a bill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillActionType {
    /// The netting engine produced the bill
    Created,
    /// The debtor confirmed paying
    DebtorAcknowledged,
    /// The creditor confirmed receiving
    CreditorAcknowledged,
    /// Both confirmations present; settlement committed
    Settled,
    /// A party contested the bill
    Disputed,
    /// An admin ruled on the dispute
    Resolved,
}

impl BillActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillActionType::Created => "created",
            BillActionType::DebtorAcknowledged => "debtor_acknowledged",
            BillActionType::CreditorAcknowledged => "creditor_acknowledged",
            BillActionType::Settled => "settled",
            BillActionType::Disputed => "disputed",
            BillActionType::Resolved => "resolved",
        }
    }
}

impl fmt::Display for BillActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BillActionType {
    type Err = BillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(BillActionType::Created),
            "debtor_acknowledged" => Ok(BillActionType::DebtorAcknowledged),
            "creditor_acknowledged" => Ok(BillActionType::CreditorAcknowledged),
            "settled" => Ok(BillActionType::Settled),
            "disputed" => Ok(BillActionType::Disputed),
            "resolved" => Ok(BillActionType::Resolved),
            other => Err(BillError::UnknownActionType(other.to_string())),
        }
    }
}

/// One audit record in a bill's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillAction {
    /// Unique identifier
    pub id: BillActionId,
    /// The bill this action belongs to
    pub bill_id: BillId,
    /// Who acted; None for system actors such as the netting scheduler
    pub actor_id: Option<UserId>,
    /// What happened
    pub action: BillActionType,
    /// Free-text detail (dispute reason, resolution notes)
    pub detail: Option<String>,
    /// When it happened
    pub created_at: DateTime<Utc>,
}

impl BillAction {
    /// Records a member-initiated action
    pub fn by_member(bill_id: BillId, actor_id: UserId, action: BillActionType) -> Self {
        Self {
            id: BillActionId::new_v7(),
            bill_id,
            actor_id: Some(actor_id),
            action,
            detail: None,
            created_at: Utc::now(),
        }
    }

    /// Records a system-initiated action (no member actor)
    pub fn by_system(bill_id: BillId, action: BillActionType) -> Self {
        Self {
            id: BillActionId::new_v7(),
            bill_id,
            actor_id: None,
            action,
            detail: None,
            created_at: Utc::now(),
        }
    }

    /// Attaches free-text detail
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
