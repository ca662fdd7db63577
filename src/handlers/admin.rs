// src/handlers/admin.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{question::Catalog, response::WipeRequest},
    store::ResponseStore,
    utils::{aggregate, export},
};

/// Dashboard headline: number of responses, newest respondent, refresh time.
pub async fn get_summary(
    State(store): State<Arc<dyn ResponseStore>>,
) -> Result<impl IntoResponse, AppError> {
    let records = store.list_all().await?;
    Ok(Json(aggregate::summary(&records)))
}

/// Lists all stored responses, newest first.
pub async fn list_responses(
    State(store): State<Arc<dyn ResponseStore>>,
) -> Result<impl IntoResponse, AppError> {
    let records = store.list_all().await?;
    Ok(Json(records))
}

/// Per-question frequency charts (pie for single-choice, bar for multi-choice).
pub async fn get_charts(
    State(store): State<Arc<dyn ResponseStore>>,
    State(catalog): State<Arc<Catalog>>,
) -> Result<impl IntoResponse, AppError> {
    let records = store.list_all().await?;
    Ok(Json(aggregate::charts(&records, &catalog)))
}

pub async fn get_table(
    State(store): State<Arc<dyn ResponseStore>>,
    State(catalog): State<Arc<Catalog>>,
) -> Result<impl IntoResponse, AppError> {
    let records = store.list_all().await?;
    Ok(Json(export::to_table(&records, &catalog)))
}

/// Downloads every response as `data.csv` (UTF-8 with BOM).
pub async fn export_csv(
    State(store): State<Arc<dyn ResponseStore>>,
    State(catalog): State<Arc<Catalog>>,
) -> Result<impl IntoResponse, AppError> {
    let records = store.list_all().await?;
    let body = export::to_csv(&records, &catalog)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"data.csv\""),
        ],
        body,
    ))
}

/// Deletes every stored response.
///
/// Requires `?confirm=true`; without it nothing is touched. Returns only after
/// the store has acknowledged the delete.
pub async fn wipe_responses(
    State(store): State<Arc<dyn ResponseStore>>,
    Query(req): Query<WipeRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !req.confirm {
        return Err(AppError::BadRequest(
            "Wiping all responses requires confirm=true".to_string(),
        ));
    }

    let removed = store.wipe_all().await?;
    tracing::warn!("Admin wiped all survey responses ({} removed)", removed);

    Ok(StatusCode::NO_CONTENT)
}
