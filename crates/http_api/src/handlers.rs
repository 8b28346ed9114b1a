use axum::{
    extract::{Json, State},
    response::IntoResponse,
};

use app_api::{ConfigPutRequest, EmptyRequest, FetchRequest, RecordsRequest, StatsRequest};

use crate::{errors::HttpError, state::HttpState};

pub async fn fetch(
    State(state): State<HttpState>,
    Json(req): Json<FetchRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let context = state.context.clone();
    let response = tokio::task::spawn_blocking(move || app_api::fetch(&context, req))
        .await
        .map_err(HttpError::worker_failed)??;
    Ok(Json(response))
}

pub async fn stats(
    State(state): State<HttpState>,
    Json(req): Json<StatsRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::stats(&state.context, req)?;
    Ok(Json(response))
}

pub async fn records(
    State(state): State<HttpState>,
    Json(req): Json<RecordsRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::records(&state.context, req)?;
    Ok(Json(response))
}

pub async fn bot_stats(
    State(state): State<HttpState>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::bot_stats(&state.context)?;
    Ok(Json(response))
}

pub async fn config_get(
    State(state): State<HttpState>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::config_get(&state.context)?;
    Ok(Json(response))
}

pub async fn config_put(
    State(state): State<HttpState>,
    Json(req): Json<ConfigPutRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::config_put(&state.context, req)?;
    Ok(Json(response))
}

pub async fn auto_sync_status(
    State(state): State<HttpState>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(app_api::auto_sync_status(&state.context)))
}

pub async fn points_info(
    State(state): State<HttpState>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let context = state.context.clone();
    let response = tokio::task::spawn_blocking(move || app_api::points_info(&context))
        .await
        .map_err(HttpError::worker_failed)??;
    Ok(Json(response))
}
