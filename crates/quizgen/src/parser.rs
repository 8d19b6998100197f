//! Parsing of raw model output into quiz structures
//!
//! Models wrap JSON in markdown fences, add a sentence before it, or get cut
//! off at the token limit. Parsing is best effort: strip fences, try to
//! parse, and for question sets try one truncation repair before giving up.
//! The repair is a heuristic and can fail on output that breaks its
//! assumptions, such as nested triple backticks inside the JSON.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::error::{QuizError, Result};
use crate::quiz::types::{GradeResult, QuestionSet};

/// Grading entry as the model writes it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GradeEntryJson {
    #[serde(default, deserialize_with = "deserialize_question_number")]
    question_number: Option<usize>,
    marks: f64,
    max_marks: f64,
    #[serde(default)]
    feedback: String,
}

/// Accepts `1`, `1.0` or `"1"`; anything else counts as absent so the
/// entry falls back to its position.
fn deserialize_question_number<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    Ok(number
        .filter(|n| n.is_finite() && *n >= 0.0 && n.fract() == 0.0)
        .map(|n| n as usize))
}

/// Remove a leading ```lang line and a trailing ``` if present.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }

    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Fence-stripped text starting at the first `opener`, skipping any prose
/// the model put before the JSON.
fn extract_json(raw: &str, opener: char) -> &str {
    let text = strip_code_fences(raw);
    match text.find(opener) {
        Some(start) => &text[start..],
        None => text,
    }
}

/// Parse the first JSON value in `text`, ignoring anything after it.
fn parse_leading<T: DeserializeOwned>(text: &str) -> std::result::Result<T, serde_json::Error> {
    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<T>();
    match stream.next() {
        Some(value) => value,
        None => serde_json::from_str(text),
    }
}

/// Cut `text` after the last complete closing delimiter and close whatever
/// is still open at that point.
///
/// Returns `None` when there is nothing to cut back to or the delimiters are
/// mismatched.
pub fn repair_truncated(text: &str) -> Option<String> {
    let mut open: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut last_cut: Option<(usize, Vec<char>)> = None;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => open.push('}'),
            '[' => open.push(']'),
            '}' | ']' => {
                if open.pop() != Some(c) {
                    return None;
                }
                last_cut = Some((i + c.len_utf8(), open.clone()));
                if open.is_empty() {
                    break;
                }
            }
            _ => {}
        }
    }

    let (cut, still_open) = last_cut?;
    let mut repaired = text[..cut].to_string();
    repaired.extend(still_open.iter().rev());
    Some(repaired)
}

fn unparseable(err: &serde_json::Error, raw: &str) -> QuizError {
    QuizError::UnparseableResponse {
        reason: err.to_string(),
        raw: raw.to_string(),
    }
}

/// Parse a generated question set, repairing truncated output once.
pub fn parse_question_set(raw: &str) -> Result<QuestionSet> {
    let text = extract_json(raw, '{');

    let first_err = match parse_leading::<QuestionSet>(text) {
        Ok(set) => return Ok(set),
        Err(e) => e,
    };

    let Some(repaired) = repair_truncated(text) else {
        warn!("Question set response is not valid JSON and cannot be repaired: {first_err}");
        return Err(unparseable(&first_err, raw));
    };

    debug!(
        "Retrying question set parse after truncation repair ({} -> {} bytes)",
        text.len(),
        repaired.len()
    );
    parse_leading::<QuestionSet>(&repaired).map_err(|e| {
        warn!("Question set response still invalid after repair: {e}");
        unparseable(&e, raw)
    })
}

/// Parse grading output. No truncation repair is attempted.
pub fn parse_grade_results(raw: &str) -> Result<Vec<GradeResult>> {
    let text = extract_json(raw, '[');

    let entries: Vec<GradeEntryJson> = parse_leading(text).map_err(|e| {
        warn!("Grading response is not valid JSON: {e}");
        unparseable(&e, raw)
    })?;

    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| GradeResult {
            question_index: entry
                .question_number
                .map_or(position, |n| n.saturating_sub(1)),
            earned_marks: entry.marks,
            max_marks: entry.max_marks,
            feedback: entry.feedback,
        })
        .collect())
}
