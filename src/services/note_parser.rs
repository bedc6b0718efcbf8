// src/services/note_parser.rs
//
// Turns the free-text completion into note fields. The model is asked for
// `### <Header>:` sections, but its output drifts, so parsing never fails:
// missing sections become empty strings and unusable lines are skipped.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::teaching_note::TrueFalseQuestion;

pub const TITLE: &str = "Title";
pub const READING_TIME: &str = "Reading Time";
pub const NOTES: &str = "Notes";
pub const TRUE_FALSE: &str = "True/False Questions";
pub const SUMMARY: &str = "Summary";

const HEADERS: [&str; 5] = [TITLE, READING_TIME, NOTES, TRUE_FALSE, SUMMARY];

static ORDINAL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+[.)]\s*(.*)$").expect("valid ordinal regex"));

static ANSWER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:[-*•]\s*)?(?:answer\s*:\s*)?\**\s*(true|false)\b\**[\s.:,\-–]*(.*)$")
        .expect("valid answer regex")
});

static BULLET_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*•]\s*(.*)$").expect("valid bullet regex"));

/// Fields extracted from one completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedNote {
    pub title: String,
    pub reading_time: String,
    pub notes: String,
    pub summary: String,
    pub questions: Vec<TrueFalseQuestion>,
}

/// Fixed prompt for one (subject, topic) pair.
pub fn build_prompt(subject: &str, topic: &str) -> String {
    format!(
        "You are an experienced teacher preparing revision material.\n\
         Write study notes for the subject \"{subject}\" on the topic \"{topic}\".\n\
         \n\
         Use exactly these section headers, in this order:\n\
         ### {TITLE}:\n\
         ### {READING_TIME}:\n\
         ### {NOTES}:\n\
         ### {TRUE_FALSE}:\n\
         ### {SUMMARY}:\n\
         \n\
         Under \"{TRUE_FALSE}\" write 5 numbered statements (\"1.\", \"2.\", ...). \
         Put the answer on the next line as \"True\" or \"False\", then one line \
         starting with \"- \" that explains the answer."
    )
}

/// Text between `### <header>:` and the next `### ` marker (or end of text),
/// trimmed. Empty when the marker is absent.
///
/// Only the known `### <Header>:` markers end a section, so markdown
/// sub-headings inside a body are kept.
pub fn extract_section(text: &str, header: &str) -> String {
    let marker = format!("### {}:", header);
    let Some(pos) = text.find(&marker) else {
        return String::new();
    };
    let rest = &text[pos + marker.len()..];
    let end = HEADERS
        .iter()
        .filter_map(|h| rest.find(&format!("### {}:", h)))
        .min()
        .unwrap_or(rest.len());
    rest[..end].trim().to_string()
}

pub fn parse_note(text: &str) -> ParsedNote {
    ParsedNote {
        title: extract_section(text, TITLE),
        reading_time: extract_section(text, READING_TIME),
        notes: extract_section(text, NOTES),
        summary: extract_section(text, SUMMARY),
        questions: parse_true_false(&extract_section(text, TRUE_FALSE)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ParseState {
    AwaitingStatement,
    AwaitingAnswer,
    AwaitingExplanation,
}

#[derive(Debug)]
struct Draft {
    statement: String,
    answer: Option<bool>,
    explanation: String,
}

impl Draft {
    fn finish(self) -> Option<TrueFalseQuestion> {
        match self.answer {
            Some(answer) => Some(TrueFalseQuestion {
                statement: self.statement,
                answer,
                explanation: self.explanation,
            }),
            None => {
                tracing::warn!("Dropping true/false question without an answer: {:?}", self.statement);
                None
            }
        }
    }
}

fn append(target: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

/// Line-oriented parse of the True/False section.
///
/// Questions that never receive a True/False line are dropped.
pub fn parse_true_false(section: &str) -> Vec<TrueFalseQuestion> {
    let mut questions = Vec::new();
    let mut state = ParseState::AwaitingStatement;
    let mut current: Option<Draft> = None;

    for line in section.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(caps) = ORDINAL_LINE.captures(line) {
            if let Some(done) = current.take().and_then(Draft::finish) {
                questions.push(done);
            }
            current = Some(Draft {
                statement: caps[1].trim().to_string(),
                answer: None,
                explanation: String::new(),
            });
            tracing::trace!("{:?} -> AwaitingAnswer", state);
            state = ParseState::AwaitingAnswer;
            continue;
        }

        let Some(draft) = current.as_mut() else {
            tracing::debug!("Skipping line before first question: {:?}", line);
            continue;
        };

        match state {
            ParseState::AwaitingAnswer => {
                if let Some(caps) = ANSWER_LINE.captures(line) {
                    draft.answer = Some(caps[1].eq_ignore_ascii_case("true"));
                    append(&mut draft.explanation, caps[2].trim());
                    tracing::trace!("AwaitingAnswer -> AwaitingExplanation");
                    state = ParseState::AwaitingExplanation;
                } else if draft.statement.is_empty() {
                    // "1." alone on its line, statement follows.
                    draft.statement = line.to_string();
                } else {
                    tracing::debug!("Expected True/False, appending to statement: {:?}", line);
                    append(&mut draft.statement, line);
                }
            }
            ParseState::AwaitingExplanation => {
                if let Some(caps) = BULLET_LINE.captures(line) {
                    if draft.explanation.is_empty() {
                        draft.explanation = caps[1].trim().to_string();
                    } else {
                        append(&mut draft.explanation, caps[1].trim());
                    }
                } else {
                    append(&mut draft.explanation, line);
                }
            }
            ParseState::AwaitingStatement => {
                tracing::debug!("Skipping unexpected line: {:?}", line);
            }
        }
    }

    if let Some(done) = current.and_then(Draft::finish) {
        questions.push(done);
    }

    questions
}
