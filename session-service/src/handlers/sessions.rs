use crate::dtos::AggregateResponse;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use metrics::counter;
use service_core::error::AppError;

fn outcome(result: &Result<AggregateResponse, AppError>) -> &'static str {
    match result {
        Ok(_) => "found",
        Err(AppError::NotFound(_)) => "not_found",
        Err(_) => "error",
    }
}

/// `GET /dbservice/{externalReferenceKey}`
#[tracing::instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<AggregateResponse>, AppError> {
    tracing::info!("Incoming session lookup");

    let result = match state.fetcher.fetch(&reference).await {
        Ok(items) => Ok(state.aggregator.aggregate(&reference, &items)),
        Err(e) => Err(e),
    };

    counter!("session_lookups_total", "outcome" => outcome(&result)).increment(1);

    let response = result?;
    tracing::info!("Aggregate response prepared");
    Ok(Json(response))
}
