// src/services/leaderboard.rs
//
// Accuracy leaderboard over raw attempt records, plus the optional profile
// enrichment step that decorates the surviving entries.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use url::Url;

use crate::{
    models::quiz_result::QuizResult,
    ports::{ProfileProvider, UserProfile},
    utils::{meta::meta_str, time::round_to},
};

/// Users with fewer attempts than this are not ranked.
pub const MIN_ATTEMPTS: usize = 3;

/// Users below this accuracy (percent) are not ranked.
pub const MIN_ACCURACY: f64 = 40.0;

pub const UNKNOWN_EMAIL: &str = "unknown@example.com";

const AVATAR_PLACEHOLDER_BASE: &str = "https://api.dicebear.com/7.x/initials/svg";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub email: String,
    pub total_attempts: usize,
    /// Percentage rounded to one decimal.
    pub avg_accuracy: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Ranking {
    /// At most `limit` entries, best first.
    pub entries: Vec<LeaderboardEntry>,
    /// Number of users that passed the activity filters, before the cap.
    pub qualified: usize,
}

#[derive(Default)]
struct UserTally {
    attempts: usize,
    correct: usize,
    email: Option<String>,
}

/// Ranks users by answer accuracy.
///
/// With a `subject`, only records whose metadata subject matches it
/// case-insensitively are counted; records without usable metadata drop out.
pub fn rank_users(results: &[QuizResult], subject: Option<&str>, limit: usize) -> Ranking {
    let subject = subject.map(str::to_lowercase);

    // Vec + index keeps first-seen order for the stable tie-break.
    let mut order: Vec<&str> = Vec::new();
    let mut tallies: HashMap<&str, UserTally> = HashMap::new();

    for r in results {
        if let Some(wanted) = &subject {
            let meta = r.meta();
            let matches = meta_str(&meta, "subject").is_some_and(|s| s.to_lowercase() == *wanted);
            if !matches {
                continue;
            }
        }

        let tally = tallies.entry(r.user_id.as_str()).or_insert_with(|| {
            order.push(r.user_id.as_str());
            UserTally::default()
        });
        tally.attempts += 1;
        if r.is_correct {
            tally.correct += 1;
        }
        // Last record wins, including a missing email.
        tally.email = r.email.clone();
    }

    let mut entries: Vec<LeaderboardEntry> = order
        .into_iter()
        .filter_map(|uid| {
            let tally = &tallies[uid];
            let accuracy = if tally.attempts > 0 {
                tally.correct as f64 / tally.attempts as f64 * 100.0
            } else {
                0.0
            };

            if tally.attempts < MIN_ATTEMPTS || accuracy < MIN_ACCURACY {
                return None;
            }

            Some(LeaderboardEntry {
                user_id: uid.to_string(),
                email: tally
                    .email
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_EMAIL.to_string()),
                total_attempts: tally.attempts,
                avg_accuracy: round_to(accuracy, 1),
                display_name: None,
                avatar_url: None,
            })
        })
        .collect();

    // `sort_by` is stable, so ties keep first-seen order.
    entries.sort_by(|a, b| b.avg_accuracy.total_cmp(&a.avg_accuracy));

    let qualified = entries.len();
    entries.truncate(limit);

    Ranking { entries, qualified }
}

/// Deterministic placeholder avatar seeded by the email address.
pub fn placeholder_avatar(email: &str) -> String {
    Url::parse_with_params(AVATAR_PLACEHOLDER_BASE, &[("seed", email)])
        .map(String::from)
        .unwrap_or_else(|_| AVATAR_PLACEHOLDER_BASE.to_string())
}

/// Fills `display_name` and `avatar_url` for every entry.
///
/// Lookups run concurrently, each bounded by `timeout`. A failed, slow or
/// empty lookup only affects its own entry, which falls back to the email
/// and a placeholder avatar.
pub async fn enrich_entries(
    entries: &mut [LeaderboardEntry],
    provider: Arc<dyn ProfileProvider>,
    timeout: Duration,
) {
    let lookups = entries.iter().map(|entry| {
        let provider = Arc::clone(&provider);
        let user_id = entry.user_id.clone();
        async move {
            match tokio::time::timeout(timeout, provider.fetch_profile(&user_id)).await {
                Ok(Ok(profile)) => Some(profile),
                Ok(Err(e)) => {
                    tracing::warn!("Profile lookup failed for {}: {}", user_id, e);
                    None
                }
                Err(_) => {
                    tracing::warn!("Profile lookup timed out for {}", user_id);
                    None
                }
            }
        }
    });

    let profiles = join_all(lookups).await;

    for (entry, profile) in entries.iter_mut().zip(profiles) {
        let UserProfile {
            display_name,
            avatar_url,
        } = profile.unwrap_or_default();

        entry.display_name = Some(display_name.unwrap_or_else(|| entry.email.clone()));
        entry.avatar_url = Some(avatar_url.unwrap_or_else(|| placeholder_avatar(&entry.email)));
    }
}
