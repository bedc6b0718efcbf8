// src/handlers/stats.rs

use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    handlers::quiz_result::RESULT_COLUMNS,
    models::quiz_result::{LeaderboardParams, QuizResult, SummaryParams},
    services::{
        leaderboard::{enrich_entries, rank_users},
        summary::{DateRange, summarize},
    },
    state::AppState,
    utils::extract::ApiQuery,
};

/// Ranks users by accuracy, optionally within one subject.
pub async fn get_leaderboard(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let subject = params
        .subject
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let results = sqlx::query_as::<_, QuizResult>(&format!(
        "SELECT {} FROM quiz_results ORDER BY id",
        RESULT_COLUMNS
    ))
    .fetch_all(&state.pool)
    .await
    .map_err(|e| {
        tracing::error!("Leaderboard generation error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let limit = state.config.leaderboard_limit;
    let mut ranking = rank_users(&results, subject.as_deref(), limit);

    if let Some(provider) = state.profiles.clone() {
        enrich_entries(&mut ranking.entries, provider, state.config.identity_timeout).await;
    }

    let meta = match &subject {
        Some(s) => format!("Top {} users for subject '{}'", limit, s),
        None => format!("Top {} users overall", limit),
    };

    Ok(Json(serde_json::json!({
        "meta": meta,
        "subject": subject,
        "leaderboard": ranking.entries,
        "count": ranking.qualified,
    })))
}

/// Per-user, per-day rollup with subject and chapter breakdowns.
pub async fn get_quiz_summary(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SummaryParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = params
        .user_id
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());

    let range = DateRange {
        start: params.start_date,
        end: params.end_date,
    };
    if let (Some(start), Some(end)) = (range.start, range.end) {
        if start > end {
            return Err(AppError::BadRequest(
                "start_date must not be after end_date".to_string(),
            ));
        }
    }

    let results = sqlx::query_as::<_, QuizResult>(&format!(
        r#"
        SELECT {} FROM quiz_results
        WHERE (?1 IS NULL OR user_id = ?1)
        ORDER BY timestamp ASC, id ASC
        "#,
        RESULT_COLUMNS
    ))
    .bind(&user_id)
    .fetch_all(&state.pool)
    .await
    .map_err(|e| {
        tracing::error!("Quiz summary error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(summarize(&results, &state.config.summary_offset, range)))
}
