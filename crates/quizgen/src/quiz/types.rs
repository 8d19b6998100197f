//! Quiz data types
//!
//! Questions, question sets and grading results. The serde shapes double as
//! the JSON the model is asked to produce, so the same types parse model
//! output and persist quizzes to disk.

use serde::{Deserialize, Deserializer, Serialize};

use crate::quiz::weight::resolve_weight;

/// Categorical question size, the fallback weight signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Short,
    Long,
    Extended,
}

impl QuestionKind {
    /// Marks implied by the category
    pub fn marks(self) -> u8 {
        match self {
            QuestionKind::Short => 1,
            QuestionKind::Long => 2,
            QuestionKind::Extended => 3,
        }
    }

    /// Lenient parse of the category label a model produced.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "short" => Some(QuestionKind::Short),
            "long" => Some(QuestionKind::Long),
            "extended" => Some(QuestionKind::Extended),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Short => "short",
            QuestionKind::Long => "long",
            QuestionKind::Extended => "extended",
        }
    }
}

/// A single quiz question
///
/// The mark weight is carried twice: as a trailing `(n)` in `text` and as the
/// categorical `kind`. Use [`Question::weight`] rather than either signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "deserialize_kind",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<QuestionKind>,
}

impl Question {
    pub fn new(text: impl Into<String>, kind: Option<QuestionKind>) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// Resolved mark weight (1-3)
    pub fn weight(&self) -> u8 {
        resolve_weight(&self.text, self.kind)
    }
}

/// Unknown or non-string category labels are treated as absent.
fn deserialize_kind<'de, D>(deserializer: D) -> Result<Option<QuestionKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(QuestionKind::parse))
}

/// A generated set of questions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    /// Short framing of what the set covers
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
}

/// A question paired with the user's answer, the grading input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredQuestion {
    pub question: Question,
    /// May be empty; blank answers earn no credit
    pub answer: String,
}

impl AnsweredQuestion {
    pub fn new(question: Question, answer: impl Into<String>) -> Self {
        Self {
            question,
            answer: answer.into(),
        }
    }
}

/// Marks and feedback for one question
///
/// Values come straight from the model; `earned_marks <= max_marks` holds for
/// well-formed responses but is not enforced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeResult {
    /// Zero-based index into the graded questions
    pub question_index: usize,
    pub earned_marks: f64,
    pub max_marks: f64,
    pub feedback: String,
}
