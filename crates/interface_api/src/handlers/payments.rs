//! Bill listing, acknowledgment, and dispute handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{BillId, OrgId};
use infra_db::{BillRepository, LedgerRepository};

use crate::auth::Claims;
use crate::dto::ledger::OptionalOrgQuery;
use crate::dto::payments::{
    AcknowledgeResponse, BillActionResponse, BillResponse, DisputeRequest, PaymentsQuery,
    SummaryResponse,
};
use crate::error::ApiError;
use crate::AppState;

/// Lists the caller's bills in an organization
///
/// Open bills only by default; `history=true` includes settled and
/// resolved bills.
pub async fn list_payments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PaymentsQuery>,
) -> Result<Json<Vec<BillResponse>>, ApiError> {
    let user_id = claims.user_id().map_err(|_| ApiError::Unauthorized)?;
    let org_id = OrgId::from(query.org);

    let repo = BillRepository::new(state.pool.clone());
    let bills = repo.list_for_member(org_id, user_id, query.history).await?;

    Ok(Json(
        bills
            .iter()
            .map(|bill| BillResponse::for_viewer(bill, user_id))
            .collect(),
    ))
}

/// Fetches one bill; the caller must be its debtor or creditor
pub async fn get_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<BillResponse>, ApiError> {
    let user_id = claims.user_id().map_err(|_| ApiError::Unauthorized)?;
    let bill_id = BillId::from(id);

    let repo = BillRepository::new(state.pool.clone());
    let bill = repo.find(bill_id).await?;
    if !bill.is_party(user_id) {
        return Err(ApiError::Forbidden(format!(
            "{} is not a party to bill {}",
            user_id, bill_id
        )));
    }

    Ok(Json(BillResponse::for_viewer(&bill, user_id)))
}

/// Returns a bill's audit trail; the caller must be a party
pub async fn get_payment_actions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BillActionResponse>>, ApiError> {
    let user_id = claims.user_id().map_err(|_| ApiError::Unauthorized)?;
    let bill_id = BillId::from(id);

    let repo = BillRepository::new(state.pool.clone());
    let bill = repo.find(bill_id).await?;
    if !bill.is_party(user_id) {
        return Err(ApiError::Forbidden(format!(
            "{} is not a party to bill {}",
            user_id, bill_id
        )));
    }
    let actions = repo.actions_for(bill_id).await?;

    Ok(Json(
        actions.into_iter().map(BillActionResponse::from).collect(),
    ))
}

/// Acknowledges a bill; the caller's role is inferred from identity
pub async fn acknowledge_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<AcknowledgeResponse>, ApiError> {
    let user_id = claims.user_id().map_err(|_| ApiError::Unauthorized)?;
    let bill_id = BillId::from(id);

    let repo = BillRepository::new(state.pool.clone());
    let effect = repo.acknowledge(bill_id, user_id).await?;
    let bill = repo.find(bill_id).await?;

    Ok(Json(AcknowledgeResponse::new(effect, &bill, user_id)))
}

/// Counts the caller's bills by viewer-relative category
///
/// With `org` set, covers that organization (the caller must be a member);
/// without it, all of the caller's organizations. Always the caller's own
/// bills: payments to make, receipts to verify, their dispute and history
/// variants.
pub async fn bill_summary(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<OptionalOrgQuery>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let user_id = claims.user_id().map_err(|_| ApiError::Unauthorized)?;
    let org_id = query.org.map(OrgId::from);

    if let Some(org) = org_id {
        let ledger = LedgerRepository::new(state.pool.clone());
        if !ledger.is_member(org, user_id).await? {
            return Err(ApiError::Forbidden(format!(
                "{} is not a member of {}",
                user_id, org
            )));
        }
    }

    let repo = BillRepository::new(state.pool.clone());
    let summary = repo.split_summary(user_id, org_id).await?;
    Ok(Json(SummaryResponse::from(summary)))
}

/// Disputes a pending bill with a stated reason
pub async fn dispute_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<DisputeRequest>,
) -> Result<Json<BillResponse>, ApiError> {
    request.validate()?;
    let user_id = claims.user_id().map_err(|_| ApiError::Unauthorized)?;
    let bill_id = BillId::from(id);

    let repo = BillRepository::new(state.pool.clone());
    let bill = repo.dispute(bill_id, user_id, &request.reason).await?;

    Ok(Json(BillResponse::for_viewer(&bill, user_id)))
}
