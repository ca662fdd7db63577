// src/handlers/survey.rs

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    error::AppError,
    models::{
        question::Catalog,
        response::SubmitResponseReply,
        submission::SubmitResponseRequest,
    },
    store::ResponseStore,
    utils::extract::AppJson,
};

/// Lists the survey questions in display order.
pub async fn list_questions(State(catalog): State<Arc<Catalog>>) -> impl IntoResponse {
    Json(catalog.all().to_vec())
}

/// Accepts a respondent's submission.
///
/// * Validates the draft against the catalog; every failure is reported at once.
/// * Appends the record; the store assigns the timestamp.
/// * Returns 201 Created with the new record id.
pub async fn submit_response(
    State(store): State<Arc<dyn ResponseStore>>,
    State(catalog): State<Arc<Catalog>>,
    AppJson(payload): AppJson<SubmitResponseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let answers = payload.validate(&catalog)?;
    let name = payload.trimmed_name();

    let id = store.append(name, &answers).await?;
    tracing::info!("Survey response {} stored ({})", id, store.backend_tag());

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponseReply {
            id,
            message: format!("Thank you, {}! Your response has been recorded.", name),
        }),
    ))
}
