//! Bill and dispute DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::UserId;
use domain_bills::{categorize, AcknowledgeEffect, Bill, BillAction, BillSplitSummary};
use infra_db::NettingRunReport;

/// Query for the payments listing
#[derive(Debug, Deserialize)]
pub struct PaymentsQuery {
    pub org: Uuid,
    #[serde(default)]
    pub history: bool,
}

/// A bill as seen by one of its parties
#[derive(Debug, Serialize)]
pub struct BillResponse {
    pub id: Uuid,
    pub org_id: Uuid,
    pub debtor_id: Uuid,
    pub creditor_id: Uuid,
    pub amount_minor: i64,
    pub period: String,
    pub status: String,
    /// Viewer-relative category; absent when the viewer is not a party
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub debtor_acknowledged_at: Option<DateTime<Utc>>,
    pub creditor_acknowledged_at: Option<DateTime<Utc>>,
    pub disputed_at: Option<DateTime<Utc>>,
    pub dispute_reason: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_outcome: Option<String>,
    pub resolution_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BillResponse {
    /// Renders a bill through one member's lens
    pub fn for_viewer(bill: &Bill, viewer: UserId) -> Self {
        let category = categorize(bill, viewer).map(|c| c.as_str().to_string());
        Self {
            id: Uuid::from(bill.id),
            org_id: Uuid::from(bill.org_id),
            debtor_id: Uuid::from(bill.debtor_id),
            creditor_id: Uuid::from(bill.creditor_id),
            amount_minor: bill.amount.minor(),
            period: bill.period.label(),
            status: bill.status.to_string(),
            category,
            debtor_acknowledged_at: bill.debtor_acknowledged_at,
            creditor_acknowledged_at: bill.creditor_acknowledged_at,
            disputed_at: bill.disputed_at,
            dispute_reason: bill.dispute_reason.clone(),
            resolved_at: bill.resolved_at,
            resolution_outcome: bill.resolution_outcome.map(|o| o.to_string()),
            resolution_notes: bill.resolution_notes.clone(),
            created_at: bill.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AcknowledgeResponse {
    /// "recorded", "already_recorded", or "settled"
    pub effect: String,
    pub bill: BillResponse,
}

impl AcknowledgeResponse {
    pub fn new(effect: AcknowledgeEffect, bill: &Bill, viewer: UserId) -> Self {
        let effect = match effect {
            AcknowledgeEffect::Recorded(_) => "recorded",
            AcknowledgeEffect::AlreadyRecorded(_) => "already_recorded",
            AcknowledgeEffect::Settled => "settled",
        };
        Self {
            effect: effect.to_string(),
            bill: BillResponse::for_viewer(bill, viewer),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct DisputeRequest {
    #[validate(length(min = 1, max = 1000))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResolveRequest {
    /// "debtor_at_fault", "creditor_at_fault", or "both_at_fault"
    pub outcome: String,
    #[validate(length(min = 1, max = 2000))]
    pub notes: String,
}

#[derive(Debug, Serialize)]
pub struct BillActionResponse {
    pub id: Uuid,
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<BillAction> for BillActionResponse {
    fn from(action: BillAction) -> Self {
        Self {
            id: Uuid::from(action.id),
            actor_id: action.actor_id.map(Uuid::from),
            action: action.action.to_string(),
            detail: action.detail,
            created_at: action.created_at,
        }
    }
}

/// The caller's bills counted by viewer-relative category
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub payment_to_make: u64,
    pub receipt_to_verify: u64,
    pub payment_in_dispute: u64,
    pub receipt_in_dispute: u64,
    pub payment_settled: u64,
    pub receipt_settled: u64,
    pub payment_resolved: u64,
    pub receipt_resolved: u64,
    pub open_total: u64,
    pub total: u64,
}

impl From<BillSplitSummary> for SummaryResponse {
    fn from(summary: BillSplitSummary) -> Self {
        Self {
            payment_to_make: summary.payment_to_make,
            receipt_to_verify: summary.receipt_to_verify,
            payment_in_dispute: summary.payment_in_dispute,
            receipt_in_dispute: summary.receipt_in_dispute,
            payment_settled: summary.payment_settled,
            receipt_settled: summary.receipt_settled,
            payment_resolved: summary.payment_resolved,
            receipt_resolved: summary.receipt_resolved,
            open_total: summary.open_total(),
            total: summary.total(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NettingRunResponse {
    pub org_id: Uuid,
    pub period: String,
    pub bills_created: usize,
    pub total_amount_minor: i64,
}

impl From<NettingRunReport> for NettingRunResponse {
    fn from(report: NettingRunReport) -> Self {
        Self {
            org_id: Uuid::from(report.org_id),
            period: report.period.label(),
            bills_created: report.bills_created,
            total_amount_minor: report.total_amount.minor(),
        }
    }
}
