// src/models/quiz_result.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::meta::{parse_meta, serialize_raw_meta};

/// Represents the 'quiz_results' table in the database.
/// One row per answered (or skipped) question.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizResult {
    pub id: i64,
    pub user_id: String,
    pub email: Option<String>,

    /// Snapshot of the question at submission time.
    pub question_id: Option<String>,
    pub question_text: Option<String>,

    pub submitted_answer_index: Option<i64>,
    pub submitted_answer_text: Option<String>,
    pub correct_answer_index: Option<i64>,
    pub correct_answer_text: Option<String>,
    pub is_correct: bool,

    /// "answered", "unanswered", "skipped", ...
    pub user_action: Option<String>,

    /// Seconds spent on the question.
    pub time_taken: Option<f64>,

    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,

    /// Raw JSON text as stored. See [`QuizResult::meta`].
    #[serde(serialize_with = "serialize_raw_meta")]
    pub meta: Option<String>,
}

impl QuizResult {
    /// Parsed metadata; empty when missing or malformed.
    pub fn meta(&self) -> Map<String, Value> {
        parse_meta(self.meta.as_deref())
    }
}

/// One entry of a submission, in the client's camelCase shape.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptInput {
    /// String or number on the wire.
    pub question_id: Option<Value>,
    pub question_text: Option<String>,
    pub submitted_answer_index: Option<i64>,
    pub submitted_answer_text: Option<String>,
    pub correct_answer_index: Option<i64>,
    pub correct_answer_text: Option<String>,
    pub is_correct: Option<bool>,
    pub user_action: Option<String>,
    pub time_taken: Option<f64>,
    pub meta: Option<Value>,
}

impl AttemptInput {
    pub fn question_id_text(&self) -> Option<String> {
        match self.question_id.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn meta_text(&self) -> Option<String> {
        match self.meta.as_ref()? {
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// DTO for `POST /api/quiz_results`.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitResultsRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing user_id or results"))]
    pub user_id: String,
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing user_id or results"))]
    pub results: Vec<AttemptInput>,
}

/// Query parameters for listing all attempt records.
#[derive(Debug, Deserialize)]
pub struct ListResultsParams {
    pub limit: Option<i64>,
    pub subject: Option<String>,
    /// Case-insensitive substring of user id or email.
    pub user: Option<String>,
}

/// Query parameters for the leaderboard.
#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub subject: Option<String>,
}

/// Query parameters for the day/subject/chapter rollup.
#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    pub user_id: Option<String>,
    /// Inclusive local-date bounds.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attempt_input_accepts_numeric_and_string_question_ids() {
        let numeric: AttemptInput =
            serde_json::from_value(json!({ "questionId": 17, "isCorrect": true })).unwrap();
        assert_eq!(numeric.question_id_text().as_deref(), Some("17"));
        assert_eq!(numeric.is_correct, Some(true));

        let text: AttemptInput = serde_json::from_value(json!({ "questionId": "q-9" })).unwrap();
        assert_eq!(text.question_id_text().as_deref(), Some("q-9"));
        assert_eq!(text.is_correct, None);
    }

    #[test]
    fn meta_text_keeps_json_encoding() {
        let input: AttemptInput =
            serde_json::from_value(json!({ "meta": { "subject": "Accounting" } })).unwrap();
        assert_eq!(input.meta_text().as_deref(), Some(r#"{"subject":"Accounting"}"#));

        let empty: AttemptInput = serde_json::from_value(json!({ "meta": null })).unwrap();
        assert_eq!(empty.meta_text(), None);
    }

    #[test]
    fn submission_requires_user_and_results() {
        let missing: SubmitResultsRequest = serde_json::from_value(json!({})).unwrap();
        assert!(missing.validate().is_err());

        let no_results: SubmitResultsRequest =
            serde_json::from_value(json!({ "user_id": "u1", "results": [] })).unwrap();
        assert!(no_results.validate().is_err());

        let ok: SubmitResultsRequest =
            serde_json::from_value(json!({ "user_id": "u1", "results": [{}] })).unwrap();
        assert!(ok.validate().is_ok());
    }
}
