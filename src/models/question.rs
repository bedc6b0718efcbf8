// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: i64,

    /// Difficulty label (e.g. "easy", "medium", "hard").
    pub difficulty: Option<String>,
    pub subject: Option<String>,
    pub chapter: Option<String>,
    pub hint: Option<String>,
    pub explanation: Option<String>,

    /// Ordered tag list, stored as a JSON array.
    pub featured: Json<Vec<String>>,

    pub hot: bool,

    pub question_text: String,

    /// Answer options in display order, stored as a JSON array.
    pub options: Json<Vec<String>>,

    /// Index into `options`.
    pub answer: Option<i64>,

    pub topic: Option<String>,
    pub normaltime: Option<String>,
    pub giventime: Option<String>,
}

/// DTO for creating a question. Also the element type of the bulk endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(max = 50))]
    pub difficulty: Option<String>,
    #[validate(length(max = 100))]
    pub subject: Option<String>,
    #[validate(length(max = 150))]
    pub chapter: Option<String>,
    pub hint: Option<String>,
    pub explanation: Option<String>,
    #[serde(default)]
    pub featured: Vec<String>,
    #[serde(default)]
    pub hot: bool,
    #[validate(length(min = 1, message = "question_text must not be empty"))]
    pub question_text: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub answer: Option<i64>,
    #[validate(length(max = 150))]
    pub topic: Option<String>,
    #[validate(length(max = 50))]
    pub normaltime: Option<String>,
    #[validate(length(max = 50))]
    pub giventime: Option<String>,
}

impl CreateQuestionRequest {
    /// `answer`, when present, must point at one of `options`.
    pub fn answer_in_range(&self) -> bool {
        match self.answer {
            Some(idx) => usize::try_from(idx).is_ok_and(|i| i < self.options.len()),
            None => true,
        }
    }
}

/// Query parameters for `/api/questions/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub chapter: Option<String>,
    pub subject: Option<String>,
    pub difficulty: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// One page of search results.
#[derive(Debug, Serialize)]
pub struct SearchPage {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
    pub items: Vec<Question>,
}

/// Response of the bulk insert endpoint. `skipped` is reserved and always 0.
#[derive(Debug, Serialize)]
pub struct BulkInsertResponse {
    pub added: usize,
    pub skipped: usize,
}
