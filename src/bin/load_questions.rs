// src/bin/load_questions.rs
//
// Posts a JSON array of questions to a running server's bulk endpoint.
//
// Usage: load_questions [FILE] [URL]
//   FILE defaults to questions.json
//   URL  defaults to http://127.0.0.1:5000/api/questions/bulk

use std::process::ExitCode;
use std::time::Duration;

const DEFAULT_FILE: &str = "questions.json";
const DEFAULT_URL: &str = "http://127.0.0.1:5000/api/questions/bulk";

#[tokio::main]
async fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| DEFAULT_FILE.to_string());
    let url = args.next().unwrap_or_else(|| DEFAULT_URL.to_string());

    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let payload: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{} is not valid JSON: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    if !payload.is_array() {
        eprintln!("{} must contain a JSON array of questions", path);
        return ExitCode::FAILURE;
    }

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let response = match client.post(&url).json(&payload).send().await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Request failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    println!("STATUS: {}", status);
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("JSON: {}", json),
        Err(_) => println!("TEXT (first 1000 chars):\n{}", body.chars().take(1000).collect::<String>()),
    }

    if status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
