// src/handlers/question.rs

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;
use sqlx::{SqliteExecutor, SqlitePool, types::Json as SqlJson};
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{
        BulkInsertResponse, CreateQuestionRequest, Question, SearchPage, SearchParams,
    },
    utils::extract::{ApiJson, ApiPath, ApiQuery},
};

const QUESTION_COLUMNS: &str = "id, difficulty, subject, chapter, hint, explanation, featured, hot, \
     question_text, options, answer, topic, normaltime, giventime";

const DEFAULT_PER_PAGE: i64 = 50;
const MAX_PER_PAGE: i64 = 500;

/// Checks field rules and the answer-index invariant.
fn check_question(req: &CreateQuestionRequest) -> Result<(), AppError> {
    req.validate()?;
    if !req.answer_in_range() {
        return Err(AppError::BadRequest(format!(
            "answer {:?} is not a valid index into {} options",
            req.answer,
            req.options.len()
        )));
    }
    Ok(())
}

fn parse_bulk_item(item: Value) -> Result<CreateQuestionRequest, AppError> {
    let req: CreateQuestionRequest = serde_json::from_value(item)?;
    check_question(&req)?;
    Ok(req)
}

async fn insert_question<'e, E>(executor: E, req: &CreateQuestionRequest) -> Result<Question, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Question>(&format!(
        r#"
        INSERT INTO questions
        (difficulty, subject, chapter, hint, explanation, featured, hot,
         question_text, options, answer, topic, normaltime, giventime)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        RETURNING {}
        "#,
        QUESTION_COLUMNS
    ))
    .bind(&req.difficulty)
    .bind(&req.subject)
    .bind(&req.chapter)
    .bind(&req.hint)
    .bind(&req.explanation)
    .bind(SqlJson(&req.featured))
    .bind(req.hot)
    .bind(&req.question_text)
    .bind(SqlJson(&req.options))
    .bind(req.answer)
    .bind(&req.topic)
    .bind(&req.normaltime)
    .bind(&req.giventime)
    .fetch_one(executor)
    .await
}

/// Creates a single question.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    ApiJson(payload): ApiJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_question(&payload)?;

    let question = insert_question(&pool, &payload).await.map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// Creates many questions from a JSON array in one transaction.
///
/// The whole batch is rejected if any element is invalid.
pub async fn bulk_create_questions(
    State(pool): State<SqlitePool>,
    ApiJson(payload): ApiJson<Value>,
) -> Result<impl IntoResponse, AppError> {
    let Value::Array(items) = payload else {
        return Err(AppError::BadRequest(
            "Expected a JSON array of questions".to_string(),
        ));
    };

    let mut requests = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        let req = parse_bulk_item(item).map_err(|e| match e {
            AppError::BadRequest(msg) => AppError::BadRequest(format!("Question #{}: {}", idx, msg)),
            other => other,
        })?;
        requests.push(req);
    }

    let mut tx = pool.begin().await?;
    for req in &requests {
        insert_question(&mut *tx, req).await.map_err(|e| {
            tracing::error!("Bulk question insert failed: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;
    }
    tx.commit().await?;

    tracing::info!("Bulk inserted {} questions", requests.len());

    Ok((
        StatusCode::CREATED,
        Json(BulkInsertResponse {
            added: requests.len(),
            skipped: 0,
        }),
    ))
}

/// Lists every question in id order.
pub async fn list_questions(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let questions = sqlx::query_as::<_, Question>(&format!(
        "SELECT {} FROM questions ORDER BY id",
        QUESTION_COLUMNS
    ))
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list questions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(questions))
}

/// Retrieves a single question by ID.
pub async fn get_question(
    State(pool): State<SqlitePool>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let question = sqlx::query_as::<_, Question>(&format!(
        "SELECT {} FROM questions WHERE id = ?1",
        QUESTION_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(question))
}

/// Wraps a filter value in `%...%` for a case-insensitive LIKE.
/// Blank filters are treated as absent.
fn like_pattern(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| format!("%{}%", v.to_lowercase()))
}

/// Paginated search by chapter, subject and difficulty.
pub async fn search_questions(
    State(pool): State<SqlitePool>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);

    let chapter = like_pattern(params.chapter);
    let subject = like_pattern(params.subject);
    let difficulty = like_pattern(params.difficulty);

    let filter = r#"
        WHERE (?1 IS NULL OR lower(chapter) LIKE ?1)
          AND (?2 IS NULL OR lower(subject) LIKE ?2)
          AND (?3 IS NULL OR lower(difficulty) LIKE ?3)
    "#;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM questions {}", filter))
        .bind(&chapter)
        .bind(&subject)
        .bind(&difficulty)
        .fetch_one(&pool)
        .await?;

    let items = sqlx::query_as::<_, Question>(&format!(
        "SELECT {} FROM questions {} ORDER BY id LIMIT ?4 OFFSET ?5",
        QUESTION_COLUMNS, filter
    ))
    .bind(&chapter)
    .bind(&subject)
    .bind(&difficulty)
    .bind(per_page)
    .bind((page - 1) * per_page)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to search questions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(SearchPage {
        page,
        per_page,
        total,
        pages: (total + per_page - 1) / per_page,
        items,
    }))
}
