//! Admin handlers: dispute review, resolution, summaries, netting trigger

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Amount, BillId, OrgId, SettlementPeriod};
use domain_bills::ResolutionOutcome;
use domain_netting::NettingConfig;
use infra_db::{BillRepository, LedgerRepository, NettingRepository};

use crate::auth::Claims;
use crate::dto::ledger::OrgQuery;
use crate::dto::payments::{BillResponse, NettingRunResponse, ResolveRequest};
use crate::error::ApiError;
use crate::AppState;

/// Rejects callers without the admin role in the organization
async fn require_org_admin(
    state: &AppState,
    claims: &Claims,
    org_id: OrgId,
) -> Result<core_kernel::UserId, ApiError> {
    let user_id = claims.user_id().map_err(|_| ApiError::Unauthorized)?;
    let repo = LedgerRepository::new(state.pool.clone());
    if !repo.is_admin(org_id, user_id).await? {
        return Err(ApiError::Forbidden(format!(
            "{} is not an admin of {}",
            user_id, org_id
        )));
    }
    Ok(user_id)
}

/// Lists an organization's disputed bills (admin only)
pub async fn list_disputes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<OrgQuery>,
) -> Result<Json<Vec<BillResponse>>, ApiError> {
    let org_id = OrgId::from(query.org);
    let admin_id = require_org_admin(&state, &claims, org_id).await?;

    let repo = BillRepository::new(state.pool.clone());
    let bills = repo.list_disputed(org_id).await?;

    Ok(Json(
        bills
            .iter()
            .map(|bill| BillResponse::for_viewer(bill, admin_id))
            .collect(),
    ))
}

/// Lists an organization's resolved disputes with outcomes (admin only)
pub async fn list_resolved_disputes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<OrgQuery>,
) -> Result<Json<Vec<BillResponse>>, ApiError> {
    let org_id = OrgId::from(query.org);
    let admin_id = require_org_admin(&state, &claims, org_id).await?;

    let repo = BillRepository::new(state.pool.clone());
    let bills = repo.list_resolved(org_id).await?;

    Ok(Json(
        bills
            .iter()
            .map(|bill| BillResponse::for_viewer(bill, admin_id))
            .collect(),
    ))
}

/// Resolves a disputed bill with an explicit outcome (admin only)
///
/// The admin check runs against the bill's owning organization inside the
/// repository transaction.
pub async fn resolve_dispute(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<BillResponse>, ApiError> {
    request.validate()?;
    let admin_id = claims.user_id().map_err(|_| ApiError::Unauthorized)?;
    let outcome: ResolutionOutcome = request
        .outcome
        .parse()
        .map_err(|_| ApiError::Validation(format!("unknown outcome '{}'", request.outcome)))?;

    let repo = BillRepository::new(state.pool.clone());
    let bill = repo
        .resolve(BillId::from(id), admin_id, outcome, &request.notes)
        .await?;

    Ok(Json(BillResponse::for_viewer(&bill, admin_id)))
}

/// Manually triggers a netting run for one organization (admin only)
///
/// Bills are created for the current settlement period. Safe to re-run:
/// open bills offset the snapshot, so already-billed debt is not re-billed.
pub async fn run_netting(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<OrgQuery>,
) -> Result<Json<NettingRunResponse>, ApiError> {
    let org_id = OrgId::from(query.org);
    require_org_admin(&state, &claims, org_id).await?;

    let config = NettingConfig::new(Amount::from_minor(state.config.settlement_threshold_minor))
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    let repo = NettingRepository::new(state.pool.clone());
    let report = repo
        .run_for_org(org_id, SettlementPeriod::current(), &config)
        .await?;

    Ok(Json(NettingRunResponse::from(report)))
}
