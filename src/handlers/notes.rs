// src/handlers/notes.rs

use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::teaching_note::NoteKey,
    services::notes::{find_cached, generate_or_fetch, list_all},
    state::AppState,
    utils::extract::{ApiJson, ApiQuery},
};

/// Returns the cached note for `{subject, topic}` or generates one.
pub async fn generate_notes(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NoteKey>,
) -> Result<impl IntoResponse, AppError> {
    let key = payload.normalized();
    key.validate()?;

    let response = generate_or_fetch(&state.pool, state.text_generator.as_deref(), &key).await?;

    Ok(Json(response))
}

/// Fetches a cached note without generating.
pub async fn get_notes(
    State(pool): State<SqlitePool>,
    ApiQuery(params): ApiQuery<NoteKey>,
) -> Result<impl IntoResponse, AppError> {
    let key = params.normalized();
    key.validate()?;

    let note = find_cached(&pool, &key)
        .await?
        .ok_or(AppError::NotFound("No notes found for this subject and topic".to_string()))?;

    Ok(Json(note))
}

/// Lists every cached note, newest first.
pub async fn list_notes(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let notes = list_all(&pool).await.map_err(|e| {
        tracing::error!("Failed to list teaching notes: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(notes))
}
