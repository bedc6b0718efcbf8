// tests/notes_tests.rs

mod common;

use std::sync::Arc;

use common::{BrokenGenerator, FakeGenerator, spawn_app, spawn_app_with};
use serde_json::{Value, json};

#[tokio::test]
async fn generated_notes_are_cached() {
    let generator = Arc::new(FakeGenerator::default());
    let app = spawn_app_with(Some(generator.clone()), None).await;
    let key = json!({ "subject": "Physics", "topic": "Newton's Laws" });

    let first = app
        .client
        .post(app.url("/api/generate_notes"))
        .json(&key)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 200);
    let first: Value = first.json().await.unwrap();
    assert_eq!(first["cached"], false);
    assert_eq!(first["title"], "Newton's Laws");
    assert_eq!(first["reading_time"], "4 minutes");
    assert_eq!(first["summary"], "Three laws relate force, mass and motion.");
    let questions = first["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["answer"], true);
    assert_eq!(questions[1]["answer"], false);
    assert_eq!(questions[1]["explanation"], "They act on different bodies.");

    // Whitespace around the key still hits the cache.
    let second: Value = app
        .client
        .post(app.url("/api/generate_notes"))
        .json(&json!({ "subject": "  Physics ", "topic": "Newton's Laws " }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["cached"], true);
    for field in ["id", "subject", "topic", "title", "reading_time", "notes", "questions", "summary"] {
        assert_eq!(first[field], second[field], "field {} differs", field);
    }
    assert_eq!(generator.calls(), 1);

    let fetched: Value = app
        .client
        .get(app.url("/api/get_notes"))
        .query(&[("subject", "Physics"), ("topic", "Newton's Laws")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["id"], first["id"]);
    assert_eq!(fetched["title"], "Newton's Laws");
}

#[tokio::test]
async fn generate_requires_subject_and_topic() {
    let app = spawn_app_with(Some(Arc::new(FakeGenerator::default())), None).await;

    let response = app
        .client
        .post(app.url("/api/generate_notes"))
        .json(&json!({ "subject": "Physics", "topic": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let missing = app
        .client
        .post(app.url("/api/generate_notes"))
        .json(&json!({ "subject": "Physics" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 400);
}

#[tokio::test]
async fn get_notes_returns_404_for_unknown_key() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/api/get_notes?subject=History&topic=Mughals"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No notes found for this subject and topic");
}

#[tokio::test]
async fn all_notes_lists_every_cached_note() {
    let app = spawn_app_with(Some(Arc::new(FakeGenerator::default())), None).await;

    let empty: Value = app
        .client
        .get(app.url("/api/all_notes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(empty, json!([]));

    for topic in ["Optics", "Waves"] {
        app.client
            .post(app.url("/api/generate_notes"))
            .json(&json!({ "subject": "Physics", "topic": topic }))
            .send()
            .await
            .unwrap();
    }

    let all: Value = app
        .client
        .get(app.url("/api/all_notes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);
    let mut topics: Vec<&str> = all.iter().map(|n| n["topic"].as_str().unwrap()).collect();
    topics.sort();
    assert_eq!(topics, ["Optics", "Waves"]);
}

#[tokio::test]
async fn generation_without_provider_is_unavailable() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/generate_notes"))
        .json(&json!({ "subject": "Physics", "topic": "Optics" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 503);
}

#[tokio::test]
async fn upstream_failure_is_reported_and_not_cached() {
    let app = spawn_app_with(Some(Arc::new(BrokenGenerator)), None).await;

    let response = app
        .client
        .post(app.url("/api/generate_notes"))
        .json(&json!({ "subject": "Physics", "topic": "Optics" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 502);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teaching_notes")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn notes_are_served_even_when_they_cannot_be_stored() {
    let generator = Arc::new(FakeGenerator::default());
    let app = spawn_app_with(Some(generator.clone()), None).await;

    sqlx::query(
        "CREATE TRIGGER reject_notes BEFORE INSERT ON teaching_notes \
         BEGIN SELECT RAISE(ABORT, 'notes are read-only'); END",
    )
    .execute(&app.pool)
    .await
    .unwrap();

    for _ in 0..2 {
        let response = app
            .client
            .post(app.url("/api/generate_notes"))
            .json(&json!({ "subject": "Physics", "topic": "Newton's Laws" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["id"], Value::Null);
        assert_eq!(body["cached"], false);
        assert_eq!(body["title"], "Newton's Laws");
        assert_eq!(body["questions"].as_array().unwrap().len(), 2);
    }

    assert_eq!(generator.calls(), 2);
}
