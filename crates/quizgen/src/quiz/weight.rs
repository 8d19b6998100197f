//! Mark weight resolution
//!
//! A question's weight arrives through two signals written by the model: a
//! trailing parenthesized integer in the question text and a categorical
//! type. They are not guaranteed to agree. The suffix wins when it is a valid
//! weight, the category is the fallback, and 1 is the default.

use std::sync::LazyLock;

use regex::Regex;

use crate::quiz::types::QuestionKind;

pub const MIN_WEIGHT: u8 = 1;
pub const MAX_WEIGHT: u8 = 3;
pub const DEFAULT_WEIGHT: u8 = MIN_WEIGHT;

static WEIGHT_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*(\d+)\s*\)\s*$").expect("valid weight suffix pattern"));

/// Weight from the trailing `(n)` suffix, if present and within 1..=3.
pub fn weight_from_suffix(text: &str) -> Option<u8> {
    let captures = WEIGHT_SUFFIX.captures(text.trim_end())?;
    let n: u8 = captures.get(1)?.as_str().parse().ok()?;
    (MIN_WEIGHT..=MAX_WEIGHT).contains(&n).then_some(n)
}

/// Resolve a question's weight from both signals.
pub fn resolve_weight(text: &str, kind: Option<QuestionKind>) -> u8 {
    weight_from_suffix(text)
        .or_else(|| kind.map(QuestionKind::marks))
        .unwrap_or(DEFAULT_WEIGHT)
}
