//! Route handlers for health and transactions.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::ApiError;
use super::AppState;
use crate::error::TallyError;
use crate::ledger::{Balance, NewTransaction, Transaction};

#[derive(Serialize)]
pub struct TransactionList {
    pub transactions: Vec<Transaction>,
    pub balance: Balance,
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn list_transactions(
    State(state): State<AppState>,
) -> Result<Json<TransactionList>, ApiError> {
    let transactions = state.store.list().await?;
    let balance = Balance::from_transactions(&transactions)?;
    debug!(count = transactions.len(), "Listing transactions");

    Ok(Json(TransactionList {
        transactions,
        balance,
    }))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    payload: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    input.validate()?;

    let transaction = Transaction::create(input);
    state.store.insert(transaction.clone()).await?;
    info!(id = %transaction.id, kind = ?transaction.kind, "Transaction created");

    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Transaction>, ApiError> {
    let id = parse_id(&id)?;
    state
        .store
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| TallyError::NotFound(id).into())
}

pub async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<Json<Transaction>, ApiError> {
    let id = parse_id(&id)?;
    let Json(input) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    input.validate()?;

    let updated = state
        .store
        .update(id, input)
        .await?
        .ok_or(TallyError::NotFound(id))?;
    info!(id = %id, "Transaction updated");

    Ok(Json(updated))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    if !state.store.delete(id).await? {
        return Err(TallyError::NotFound(id).into());
    }
    info!(id = %id, "Transaction deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("invalid transaction id: {}", raw)))
}
