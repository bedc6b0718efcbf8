// src/handlers/quiz_result.rs

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::quiz_result::{ListResultsParams, QuizResult, SubmitResultsRequest},
    utils::{
        extract::{ApiJson, ApiPath, ApiQuery},
        meta::meta_str,
    },
};

pub(crate) const RESULT_COLUMNS: &str = "id, user_id, email, question_id, question_text, \
     submitted_answer_index, submitted_answer_text, correct_answer_index, correct_answer_text, \
     is_correct, user_action, time_taken, timestamp, meta";

const DEFAULT_USER_ACTION: &str = "unanswered";

/// Records a batch of attempts for one user.
///
/// All rows are written in a single transaction, so `saved` is either the
/// full batch or the request fails.
pub async fn submit_results(
    State(pool): State<SqlitePool>,
    ApiJson(req): ApiJson<SubmitResultsRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let submitted_at = Utc::now();
    let mut tx = pool.begin().await?;

    for r in &req.results {
        sqlx::query(
            r#"
            INSERT INTO quiz_results
            (user_id, email, question_id, question_text,
             submitted_answer_index, submitted_answer_text,
             correct_answer_index, correct_answer_text,
             is_correct, user_action, time_taken, timestamp, meta)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&req.user_id)
        .bind(&req.email)
        .bind(r.question_id_text())
        .bind(&r.question_text)
        .bind(r.submitted_answer_index)
        .bind(&r.submitted_answer_text)
        .bind(r.correct_answer_index)
        .bind(&r.correct_answer_text)
        .bind(r.is_correct.unwrap_or(false))
        .bind(r.user_action.as_deref().unwrap_or(DEFAULT_USER_ACTION))
        .bind(r.time_taken)
        .bind(submitted_at)
        .bind(r.meta_text())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert quiz result for {}: {:?}", req.user_id, e);
            AppError::InternalServerError(e.to_string())
        })?;
    }

    tx.commit().await?;

    tracing::info!("Saved {} quiz results for {}", req.results.len(), req.user_id);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "saved": req.results.len(),
        })),
    ))
}

/// Lists one user's attempts, newest first.
pub async fn list_user_results(
    State(pool): State<SqlitePool>,
    ApiPath(user_id): ApiPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let results = sqlx::query_as::<_, QuizResult>(&format!(
        "SELECT {} FROM quiz_results WHERE user_id = ?1 ORDER BY timestamp DESC, id DESC",
        RESULT_COLUMNS
    ))
    .bind(&user_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch quiz results for {}: {:?}", user_id, e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(results))
}

/// Lists all attempts, newest first.
///
/// `user` matches user id or email (case-insensitive substring), `subject`
/// matches the metadata subject case-insensitively, and `limit` applies
/// after both filters.
pub async fn list_results(
    State(pool): State<SqlitePool>,
    ApiQuery(params): ApiQuery<ListResultsParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_pattern = params
        .user
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(|u| format!("%{}%", u.to_lowercase()));

    let rows = sqlx::query_as::<_, QuizResult>(&format!(
        r#"
        SELECT {} FROM quiz_results
        WHERE (?1 IS NULL OR lower(user_id) LIKE ?1 OR lower(email) LIKE ?1)
        ORDER BY timestamp DESC, id DESC
        "#,
        RESULT_COLUMNS
    ))
    .bind(&user_pattern)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list quiz results: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let subject = params
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut results: Vec<QuizResult> = match subject {
        Some(wanted) => rows
            .into_iter()
            .filter(|r| meta_str(&r.meta(), "subject").is_some_and(|s| s.to_lowercase() == wanted))
            .collect(),
        None => rows,
    };

    if let Some(limit) = params.limit.filter(|l| *l > 0) {
        results.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }

    Ok(Json(results))
}
