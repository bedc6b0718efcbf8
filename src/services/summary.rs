// src/services/summary.rs
//
// Folds attempt records into per-user, per-local-day buckets with nested
// subject and chapter breakdowns.

use std::collections::HashMap;

use chrono::{FixedOffset, NaiveDate};
use serde::Serialize;

use crate::{
    models::quiz_result::QuizResult,
    utils::{
        meta::meta_str,
        time::{local_date_time, round_to},
    },
};

pub const UNKNOWN_SUBJECT: &str = "Unknown Subject";
pub const UNKNOWN_CHAPTER: &str = "Unknown Chapter";

const MIDNIGHT: &str = "00:00:00";

#[derive(Debug, Clone, Serialize)]
pub struct ChapterSummary {
    pub chapter: String,
    pub attempts: u32,
    pub correct: u32,
    pub total_time: f64,
    pub last_attempt_time: String,
    pub accuracy: f64,
    pub avg_time_sec: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectSummary {
    pub subject: String,
    pub total_attempts: u32,
    pub total_correct: u32,
    pub total_time: f64,
    pub accuracy: f64,
    pub avg_time_sec: f64,
    pub chapters: Vec<ChapterSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub user_id: String,
    pub email: Option<String>,
    pub date: String,
    pub last_attempt_time: String,
    pub total_attempts: u32,
    pub total_correct: u32,
    pub total_questions: u32,
    pub total_time: f64,
    pub accuracy: f64,
    pub avg_time_sec: f64,
    pub subjects: Vec<SubjectSummary>,
}

/// Inclusive bounds on the local calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    fn contains(&self, date: &str) -> bool {
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") else {
            return false;
        };
        self.start.is_none_or(|s| day >= s) && self.end.is_none_or(|e| day <= e)
    }
}

/// Builds the nested rollup.
///
/// `results` must be ordered by timestamp ascending. Records without a
/// timestamp are skipped. Every collection keeps first-seen order.
pub fn summarize(results: &[QuizResult], offset: &FixedOffset, range: DateRange) -> Vec<DaySummary> {
    let mut days: Vec<DaySummary> = Vec::new();
    let mut day_index: HashMap<(String, String), usize> = HashMap::new();

    for r in results {
        let Some(ts) = r.timestamp else {
            continue;
        };
        let (date, time) = local_date_time(ts, offset);
        if !range.contains(&date) {
            continue;
        }

        let meta = r.meta();
        let subject = meta_str(&meta, "subject").unwrap_or(UNKNOWN_SUBJECT);
        let chapter = meta_str(&meta, "chapter").unwrap_or(UNKNOWN_CHAPTER);
        let time_taken = r.time_taken.unwrap_or(0.0);
        let hit = u32::from(r.is_correct);

        let idx = *day_index
            .entry((r.user_id.clone(), date.clone()))
            .or_insert_with(|| {
                days.push(DaySummary {
                    user_id: r.user_id.clone(),
                    email: None,
                    date: date.clone(),
                    last_attempt_time: MIDNIGHT.to_string(),
                    total_attempts: 0,
                    total_correct: 0,
                    total_questions: 0,
                    total_time: 0.0,
                    accuracy: 0.0,
                    avg_time_sec: 0.0,
                    subjects: Vec::new(),
                });
                days.len() - 1
            });
        let day = &mut days[idx];

        day.email = r.email.clone();
        // Lexicographic max over HH:MM:SS strings.
        if time > day.last_attempt_time {
            day.last_attempt_time = time.clone();
        }
        day.total_attempts += 1;
        day.total_questions += 1;
        day.total_time += time_taken;
        day.total_correct += hit;

        let si = match day.subjects.iter().position(|s| s.subject == subject) {
            Some(i) => i,
            None => {
                day.subjects.push(SubjectSummary {
                    subject: subject.to_string(),
                    total_attempts: 0,
                    total_correct: 0,
                    total_time: 0.0,
                    accuracy: 0.0,
                    avg_time_sec: 0.0,
                    chapters: Vec::new(),
                });
                day.subjects.len() - 1
            }
        };
        let subj = &mut day.subjects[si];
        subj.total_attempts += 1;
        subj.total_time += time_taken;
        subj.total_correct += hit;

        let ci = match subj.chapters.iter().position(|c| c.chapter == chapter) {
            Some(i) => i,
            None => {
                subj.chapters.push(ChapterSummary {
                    chapter: chapter.to_string(),
                    attempts: 0,
                    correct: 0,
                    total_time: 0.0,
                    last_attempt_time: time.clone(),
                    accuracy: 0.0,
                    avg_time_sec: 0.0,
                });
                subj.chapters.len() - 1
            }
        };
        let chap = &mut subj.chapters[ci];
        chap.attempts += 1;
        chap.total_time += time_taken;
        chap.correct += hit;
        // Replaced only on a strictly later time.
        if time > chap.last_attempt_time {
            chap.last_attempt_time = time;
        }
    }

    for day in &mut days {
        day.accuracy = percent(day.total_correct, day.total_questions);
        day.avg_time_sec = average(day.total_time, day.total_questions);

        for subj in &mut day.subjects {
            subj.accuracy = percent(subj.total_correct, subj.total_attempts);
            subj.avg_time_sec = average(subj.total_time, subj.total_attempts);

            for chap in &mut subj.chapters {
                chap.accuracy = percent(chap.correct, chap.attempts);
                chap.avg_time_sec = average(chap.total_time, chap.attempts);
            }
        }
    }

    days
}

// Nodes only exist once an attempt lands in them, so `count` is never 0.
fn percent(correct: u32, count: u32) -> f64 {
    round_to(f64::from(correct) / f64::from(count) * 100.0, 1)
}

fn average(total: f64, count: u32) -> f64 {
    round_to(total / f64::from(count), 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(330 * 60).unwrap()
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap()
    }

    fn attempt(
        user: &str,
        correct: bool,
        time_taken: Option<f64>,
        ts: Option<DateTime<Utc>>,
        meta: Option<&str>,
    ) -> QuizResult {
        QuizResult {
            id: 0,
            user_id: user.to_string(),
            email: Some(format!("{}@mail.test", user)),
            question_id: Some("1".to_string()),
            question_text: None,
            submitted_answer_index: Some(0),
            submitted_answer_text: None,
            correct_answer_index: Some(0),
            correct_answer_text: None,
            is_correct: correct,
            user_action: Some("answered".to_string()),
            time_taken,
            timestamp: ts,
            meta: meta.map(str::to_string),
        }
    }

    const ACC_CH1: &str = r#"{"subject":"Accounting","chapter":"Ledgers"}"#;
    const ACC_CH2: &str = r#"{"subject":"Accounting","chapter":"Journals"}"#;
    const PHY_CH1: &str = r#"{"subject":"Physics","chapter":"Optics"}"#;

    #[test]
    fn three_attempts_one_correct() {
        let results = vec![
            attempt("u1", true, Some(30.0), Some(at(4, 0, 0)), Some(ACC_CH1)),
            attempt("u1", false, Some(45.0), Some(at(4, 1, 0)), Some(ACC_CH1)),
            attempt("u1", false, Some(15.0), Some(at(4, 2, 0)), Some(ACC_CH1)),
        ];
        let days = summarize(&results, &ist(), DateRange::default());

        assert_eq!(days.len(), 1);
        let day = &days[0];
        assert_eq!(day.date, "2024-05-01");
        assert_eq!(day.total_attempts, 3);
        assert_eq!(day.total_correct, 1);
        assert_eq!(day.accuracy, 33.3);
        assert_eq!(day.avg_time_sec, 30.0);
        assert_eq!(day.last_attempt_time, "09:32:00");
    }

    #[test]
    fn totals_are_consistent_across_levels() {
        let results = vec![
            attempt("u1", true, Some(10.0), Some(at(1, 0, 0)), Some(ACC_CH1)),
            attempt("u1", false, Some(20.0), Some(at(1, 5, 0)), Some(ACC_CH2)),
            attempt("u1", true, Some(30.0), Some(at(1, 10, 0)), Some(PHY_CH1)),
            attempt("u1", true, None, Some(at(1, 15, 0)), Some(ACC_CH1)),
            attempt("u2", false, Some(5.0), Some(at(1, 20, 0)), None),
        ];
        let days = summarize(&results, &ist(), DateRange::default());
        assert_eq!(days.len(), 2);

        for day in &days {
            let subj_total: u32 = day.subjects.iter().map(|s| s.total_attempts).sum();
            assert_eq!(day.total_attempts, subj_total);
            assert!(day.total_correct <= day.total_attempts);
            assert!((0.0..=100.0).contains(&day.accuracy));

            for s in &day.subjects {
                let chap_total: u32 = s.chapters.iter().map(|c| c.attempts).sum();
                assert_eq!(s.total_attempts, chap_total);
                assert!(s.total_correct <= s.total_attempts);
                assert!((0.0..=100.0).contains(&s.accuracy));
                for c in &s.chapters {
                    assert!(c.correct <= c.attempts);
                    assert!((0.0..=100.0).contains(&c.accuracy));
                }
            }
        }

        let u1 = &days[0];
        let subjects: Vec<&str> = u1.subjects.iter().map(|s| s.subject.as_str()).collect();
        assert_eq!(subjects, vec!["Accounting", "Physics"]);
        let chapters: Vec<&str> = u1.subjects[0]
            .chapters
            .iter()
            .map(|c| c.chapter.as_str())
            .collect();
        assert_eq!(chapters, vec!["Ledgers", "Journals"]);

        // Missing time counts as zero.
        let ledgers = &u1.subjects[0].chapters[0];
        assert_eq!(ledgers.attempts, 2);
        assert_eq!(ledgers.avg_time_sec, 5.0);
    }

    #[test]
    fn missing_or_malformed_meta_uses_unknown_labels() {
        let results = vec![
            attempt("u1", true, Some(1.0), Some(at(2, 0, 0)), None),
            attempt("u1", true, Some(1.0), Some(at(2, 1, 0)), Some("garbage")),
            attempt("u1", true, Some(1.0), Some(at(2, 2, 0)), Some(r#"{"subject":"Maths"}"#)),
        ];
        let days = summarize(&results, &ist(), DateRange::default());
        let day = &days[0];

        assert_eq!(day.subjects[0].subject, UNKNOWN_SUBJECT);
        assert_eq!(day.subjects[0].total_attempts, 2);
        assert_eq!(day.subjects[0].chapters[0].chapter, UNKNOWN_CHAPTER);
        assert_eq!(day.subjects[1].subject, "Maths");
        assert_eq!(day.subjects[1].chapters[0].chapter, UNKNOWN_CHAPTER);
    }

    #[test]
    fn records_without_timestamp_are_skipped() {
        let results = vec![
            attempt("u1", true, Some(10.0), None, Some(ACC_CH1)),
            attempt("u1", false, Some(10.0), Some(at(3, 0, 0)), Some(ACC_CH1)),
        ];
        let days = summarize(&results, &ist(), DateRange::default());
        assert_eq!(days[0].total_attempts, 1);
        assert_eq!(days[0].total_correct, 0);
    }

    #[test]
    fn days_split_on_local_midnight() {
        // 18:29:59 UTC is 23:59:59 IST, 18:30:00 UTC is the next local day.
        let results = vec![
            attempt("u1", true, Some(1.0), Some(at(18, 29, 59)), Some(ACC_CH1)),
            attempt("u1", true, Some(1.0), Some(at(18, 30, 0)), Some(ACC_CH1)),
        ];
        let days = summarize(&results, &ist(), DateRange::default());
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2024-05-01");
        assert_eq!(days[0].last_attempt_time, "23:59:59");
        assert_eq!(days[1].date, "2024-05-02");
        assert_eq!(days[1].last_attempt_time, "00:00:00");
    }

    #[test]
    fn last_attempt_time_tracks_latest_even_if_out_of_order() {
        let results = vec![
            attempt("u1", true, Some(1.0), Some(at(6, 0, 0)), Some(ACC_CH1)),
            attempt("u1", true, Some(1.0), Some(at(5, 0, 0)), Some(ACC_CH1)),
        ];
        let days = summarize(&results, &ist(), DateRange::default());
        assert_eq!(days[0].last_attempt_time, "11:30:00");
        assert_eq!(days[0].subjects[0].chapters[0].last_attempt_time, "11:30:00");
    }

    #[test]
    fn date_range_is_inclusive() {
        let results = vec![
            attempt("u1", true, Some(1.0), Some(Utc.with_ymd_and_hms(2024, 5, 1, 4, 0, 0).unwrap()), None),
            attempt("u1", true, Some(1.0), Some(Utc.with_ymd_and_hms(2024, 5, 2, 4, 0, 0).unwrap()), None),
            attempt("u1", true, Some(1.0), Some(Utc.with_ymd_and_hms(2024, 5, 3, 4, 0, 0).unwrap()), None),
        ];
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2024, 5, 2),
            end: NaiveDate::from_ymd_opt(2024, 5, 3),
        };
        let days = summarize(&results, &ist(), range);
        let dates: Vec<&str> = days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-05-02", "2024-05-03"]);
    }
}
