// src/services/notes.rs
//
// Generate-or-fetch for teaching notes. The cache lookup and the insert are
// not locked together: two concurrent misses for the same key may both
// generate and both insert, and lookups take the oldest row.

use chrono::Utc;
use sqlx::{SqlitePool, types::Json};

use crate::{
    error::AppError,
    models::teaching_note::{NoteKey, NoteResponse, TeachingNote},
    ports::TextGenerator,
    services::note_parser::{ParsedNote, build_prompt, parse_note},
};

const NOTE_COLUMNS: &str =
    "id, subject, topic, title, reading_time, notes, summary, questions, created_at, updated_at";

/// First stored note for (subject, topic), if any.
pub async fn find_cached(pool: &SqlitePool, key: &NoteKey) -> Result<Option<TeachingNote>, sqlx::Error> {
    sqlx::query_as::<_, TeachingNote>(&format!(
        "SELECT {} FROM teaching_notes WHERE subject = ?1 AND topic = ?2 ORDER BY id LIMIT 1",
        NOTE_COLUMNS
    ))
    .bind(&key.subject)
    .bind(&key.topic)
    .fetch_optional(pool)
    .await
}

/// All stored notes, newest first.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<TeachingNote>, sqlx::Error> {
    sqlx::query_as::<_, TeachingNote>(&format!(
        "SELECT {} FROM teaching_notes ORDER BY created_at DESC, id DESC",
        NOTE_COLUMNS
    ))
    .fetch_all(pool)
    .await
}

async fn insert_note(pool: &SqlitePool, note: &TeachingNote) -> Result<TeachingNote, sqlx::Error> {
    sqlx::query_as::<_, TeachingNote>(&format!(
        r#"
        INSERT INTO teaching_notes
        (subject, topic, title, reading_time, notes, summary, questions, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        RETURNING {}
        "#,
        NOTE_COLUMNS
    ))
    .bind(&note.subject)
    .bind(&note.topic)
    .bind(&note.title)
    .bind(&note.reading_time)
    .bind(&note.notes)
    .bind(&note.summary)
    .bind(&note.questions)
    .bind(note.created_at)
    .bind(note.updated_at)
    .fetch_one(pool)
    .await
}

fn build_note(key: &NoteKey, parsed: ParsedNote) -> TeachingNote {
    let now = Utc::now();
    TeachingNote {
        id: None,
        subject: key.subject.clone(),
        topic: key.topic.clone(),
        title: parsed.title,
        reading_time: parsed.reading_time,
        notes: parsed.notes,
        summary: parsed.summary,
        questions: Json(parsed.questions),
        created_at: now,
        updated_at: now,
    }
}

/// Returns the cached note for `key`, or generates, parses and stores one.
///
/// A failed insert is logged and the freshly parsed note is still returned
/// (without an `id`); the next request will generate again.
pub async fn generate_or_fetch(
    pool: &SqlitePool,
    generator: Option<&dyn TextGenerator>,
    key: &NoteKey,
) -> Result<NoteResponse, AppError> {
    if let Some(note) = find_cached(pool, key).await? {
        tracing::debug!("Teaching note cache hit for {} / {}", key.subject, key.topic);
        return Ok(NoteResponse { note, cached: true });
    }

    let generator = generator.ok_or_else(|| {
        AppError::ServiceUnavailable("Note generation is not configured".to_string())
    })?;

    tracing::info!("Generating teaching note for {} / {}", key.subject, key.topic);
    let text = generator
        .generate(&build_prompt(&key.subject, &key.topic))
        .await
        .map_err(|e| AppError::BadGateway(format!("Note generation failed: {}", e)))?;

    let parsed = parse_note(&text);
    tracing::debug!(
        "Parsed note {:?} with {} true/false questions",
        parsed.title,
        parsed.questions.len()
    );
    let note = build_note(key, parsed);

    match insert_note(pool, &note).await {
        Ok(stored) => Ok(NoteResponse {
            note: stored,
            cached: false,
        }),
        Err(e) => {
            tracing::error!(
                "Failed to cache teaching note for {} / {}: {:?}",
                key.subject,
                key.topic,
                e
            );
            Ok(NoteResponse { note, cached: false })
        }
    }
}
