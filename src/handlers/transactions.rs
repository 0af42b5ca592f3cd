use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::db::queries;
use crate::error::AppError;
use crate::AppState;

/// Operator lookup of a recorded payment by its provider reference.
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let transaction = queries::find_payment_by_reference(&state.db, &reference)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", reference)))?;

    Ok(Json(transaction))
}
