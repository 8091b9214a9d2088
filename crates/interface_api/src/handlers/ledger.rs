//! Balance, transaction history, and rental collaborator handlers

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Amount, OrgId, RentalId, UserId};
use infra_db::LedgerRepository;

use crate::auth::{self, Claims};
use crate::dto::ledger::{
    BalanceResponse, OrgQuery, RentalCompletedRequest, RentalCompletedResponse,
    TransactionResponse,
};
use crate::error::ApiError;
use crate::AppState;

/// Returns the caller's balance within an organization
pub async fn get_balance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<OrgQuery>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let user_id = claims.user_id().map_err(|_| ApiError::Unauthorized)?;
    let org_id = OrgId::from(query.org);

    let repo = LedgerRepository::new(state.pool.clone());
    let balance = repo.balance_of(org_id, user_id).await?;

    Ok(Json(BalanceResponse {
        org_id: query.org,
        user_id: Uuid::from(user_id),
        balance_minor: balance.minor(),
    }))
}

/// Returns the caller's transaction history within an organization
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<OrgQuery>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let user_id = claims.user_id().map_err(|_| ApiError::Unauthorized)?;
    let org_id = OrgId::from(query.org);

    let repo = LedgerRepository::new(state.pool.clone());
    if !repo.is_member(org_id, user_id).await? {
        return Err(ApiError::Forbidden(format!(
            "{} is not a member of {}",
            user_id, org_id
        )));
    }
    let transactions = repo.transactions_for(org_id, user_id).await?;

    Ok(Json(
        transactions.into_iter().map(TransactionResponse::from).collect(),
    ))
}

/// Rejects tokens that do not belong to the rental service
///
/// Ledger postings from this endpoint name arbitrary members, so a plain
/// member token must never reach the repository.
fn ensure_service_caller(claims: &Claims) -> Result<(), ApiError> {
    if !auth::has_role(claims, "service") {
        return Err(ApiError::Forbidden(
            "rental completion requires a service token".to_string(),
        ));
    }
    Ok(())
}

/// Rental collaborator callback: posts the debit/credit pair for a
/// completed rental in one transaction
///
/// Restricted to the rental service's own token.
pub async fn rental_completed(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<RentalCompletedRequest>,
) -> Result<Json<RentalCompletedResponse>, ApiError> {
    ensure_service_caller(&claims)?;
    request.validate()?;

    let repo = LedgerRepository::new(state.pool.clone());
    let (debit, credit) = repo
        .record_rental_completion(
            OrgId::from(request.org),
            UserId::from(request.renter),
            UserId::from(request.owner),
            Amount::from_minor(request.cost_minor),
            RentalId::from(request.rental_id),
        )
        .await?;

    Ok(Json(RentalCompletedResponse {
        debit_tx_id: Uuid::from(debit),
        credit_tx_id: Uuid::from(credit),
    }))
}
