// src/models/teaching_note.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

/// One generated true/false check question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrueFalseQuestion {
    pub statement: String,
    pub answer: bool,
    pub explanation: String,
}

/// Represents the 'teaching_notes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeachingNote {
    /// `None` when the note could not be persisted.
    pub id: Option<i64>,
    pub subject: String,
    pub topic: String,
    pub title: String,
    pub reading_time: String,
    pub notes: String,
    pub summary: String,
    pub questions: Json<Vec<TrueFalseQuestion>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response of `/api/generate_notes`.
#[derive(Debug, Serialize)]
pub struct NoteResponse {
    #[serde(flatten)]
    pub note: TeachingNote,
    /// True when served from the cache without a generation call.
    pub cached: bool,
}

/// Body of `/api/generate_notes` and query of `/api/get_notes`.
#[derive(Debug, Deserialize, Validate)]
pub struct NoteKey {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "subject is required"))]
    pub subject: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "topic is required"))]
    pub topic: String,
}

impl NoteKey {
    /// Trimmed copy, so " Physics " and "Physics" share a cache entry.
    pub fn normalized(&self) -> NoteKey {
        NoteKey {
            subject: self.subject.trim().to_string(),
            topic: self.topic.trim().to_string(),
        }
    }
}
