// src/config.rs

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use chrono::FixedOffset;
use dotenvy::dotenv;

/// Default origins allowed to call the `/api` routes from a browser.
pub const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "https://sunilbasudeo.com",
    "https://www.sunilbasudeo.com",
    "http://localhost:3000",
];

/// Asia/Kolkata (UTC+05:30, no daylight saving).
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: SocketAddr,
    pub rust_log: String,
    pub cors_origins: Vec<String>,

    /// Offset used to turn UTC attempt timestamps into local calendar days.
    pub summary_offset: FixedOffset,
    pub leaderboard_limit: usize,

    /// Identity provider used to decorate leaderboard entries.
    /// Enrichment is skipped when no key is configured.
    pub identity_api_url: String,
    pub identity_api_key: Option<String>,
    pub identity_timeout: Duration,

    /// OpenAI-compatible chat completions endpoint for teaching notes.
    /// Generation is unavailable when no key is configured.
    pub llm_api_url: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_timeout: Duration,

    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://questions.db".to_string());

        let bind_address = env::var("BIND_ADDRESS")
            .unwrap_or_else(|_| "0.0.0.0:5000".to_string())
            .parse::<SocketAddr>()
            .expect("BIND_ADDRESS must be a valid socket address");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| parse_list(&raw))
            .unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect());

        let offset_minutes = parse_var("SUMMARY_UTC_OFFSET_MINUTES", DEFAULT_UTC_OFFSET_MINUTES);
        let summary_offset = offset_from_minutes(offset_minutes)
            .expect("SUMMARY_UTC_OFFSET_MINUTES must be within +/- 24 hours");

        let leaderboard_limit = parse_var("LEADERBOARD_LIMIT", DEFAULT_LEADERBOARD_LIMIT);

        let identity_api_url = env::var("IDENTITY_API_URL")
            .unwrap_or_else(|_| "https://api.clerk.com/v1".to_string());
        let identity_api_key = non_empty_var("IDENTITY_API_KEY");
        let identity_timeout = Duration::from_millis(parse_var("IDENTITY_TIMEOUT_MS", 3000));

        let llm_api_url =
            env::var("LLM_API_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let llm_api_key = non_empty_var("LLM_API_KEY");
        let llm_model = env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let llm_timeout = Duration::from_secs(parse_var("LLM_TIMEOUT_SECS", 60));

        let request_timeout = Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 120));

        Self {
            database_url,
            bind_address,
            rust_log,
            cors_origins,
            summary_offset,
            leaderboard_limit,
            identity_api_url,
            identity_api_key,
            identity_timeout,
            llm_api_url,
            llm_api_key,
            llm_model,
            llm_timeout,
            request_timeout,
        }
    }
}

/// Builds a fixed UTC offset from a signed number of minutes.
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(minutes.checked_mul(60)?)
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
