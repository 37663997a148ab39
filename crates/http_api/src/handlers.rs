use axum::{
    extract::{Json, State},
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

use app_api::{AccountsRequest, EmptyRequest, SelectionRequest};
use usage_app::ViewState;

use crate::{errors::HttpError, extract::ApiJson, state::HttpState};

pub async fn status(
    State(state): State<HttpState>,
    ApiJson(_): ApiJson<EmptyRequest>,
) -> impl IntoResponse {
    Json(app_api::status(&state.context))
}

pub async fn refresh(
    State(state): State<HttpState>,
    ApiJson(_): ApiJson<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let context = state.context.clone();
    let report = tokio::task::spawn_blocking(move || app_api::refresh(&context))
        .await
        .map_err(|err| {
            HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), None)
        })??;
    Ok(Json(report))
}

pub async fn accounts(
    State(state): State<HttpState>,
    ApiJson(req): ApiJson<AccountsRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let context = state.context.clone();
    let response = tokio::task::spawn_blocking(move || app_api::accounts(&context, req))
        .await
        .map_err(|err| {
            HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), None)
        })??;
    Ok(Json(response))
}

pub async fn timeseries(
    State(state): State<HttpState>,
    ApiJson(req): ApiJson<SelectionRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::timeseries(&state.context, req)?;
    Ok(Json(response))
}

pub async fn breakdown(
    State(state): State<HttpState>,
    ApiJson(req): ApiJson<SelectionRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::breakdown(&state.context, req)?;
    Ok(Json(response))
}

pub async fn summary(
    State(state): State<HttpState>,
    ApiJson(req): ApiJson<SelectionRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::summary(&state.context, req)?;
    Ok(Json(response))
}

/// CSV download; 204 while the selection is incomplete.
pub async fn export(
    State(state): State<HttpState>,
    ApiJson(req): ApiJson<SelectionRequest>,
) -> Result<Response, HttpError> {
    let artifact = match app_api::export(&state.context, req)? {
        ViewState::Idle => return Ok(StatusCode::NO_CONTENT.into_response()),
        ViewState::Ready(artifact) => artifact,
    };
    let headers = [
        (header::CONTENT_TYPE, artifact.content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.file_name),
        ),
    ];
    Ok((headers, artifact.body).into_response())
}

pub async fn not_found(uri: Uri) -> HttpError {
    HttpError::new(
        StatusCode::NOT_FOUND,
        format!("no route for {}", uri.path()),
        Some("not_found".to_string()),
    )
}
