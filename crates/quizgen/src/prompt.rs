//! Prompts for question generation and answer grading
//!
//! Both orchestrators send a fixed system instruction plus a user prompt
//! built from the caller's documents or answers.

use crate::document::Document;
use crate::quiz::types::AnsweredQuestion;

/// Line placed before the documents in the generation prompt
pub const DOCUMENTS_OPENING: &str =
    "Generate quiz questions from the following notes. Each note starts with its path.";

/// Line placed after the documents in the generation prompt
pub const DOCUMENTS_CLOSING: &str =
    "Only use information contained in the notes above. Respond with the JSON object only.";

/// Marker rendered in place of a blank answer
pub const NO_ANSWER_MARKER: &str = "(no answer provided)";

/// System instruction for question generation
///
/// Placeholder: {count} - number of questions to request
pub const GENERATION_SYSTEM_PROMPT: &str = r#"You are a teacher writing a self-assessment quiz from a student's notes.

Write {count} questions that test understanding of the notes, mixing recall and explanation.

Every question must end with its mark weight in parentheses: (1), (2) or (3).
Give every question a "type" that matches its weight:
- "short" for (1): a single fact or definition
- "long" for (2): an explanation of a concept or process
- "extended" for (3): a discussion connecting several ideas

Write the questions in the same language as the notes.

Respond with a JSON object in this exact format:
{
  "description": "One sentence describing what the quiz covers",
  "questions": [
    {"question": "What does photosynthesis convert? (1)", "type": "short"},
    {"question": "Explain why leaves are green. (2)", "type": "long"}
  ]
}

Only include the JSON object, no other text and no markdown code fences."#;

/// System instruction for grading
pub const GRADING_SYSTEM_PROMPT: &str = r#"You are a fair teacher marking a student's quiz against the source material.

For each question, award between 0 and the question's maximum marks. Give partial credit for partially correct answers. An answer marked "(no answer provided)" earns 0 marks.

Write short, specific feedback for every question explaining what was right and what was missing. Write the feedback in the same language as the source material.

Respond with a JSON array with one entry per question, in this exact format:
[
  {"questionNumber": 1, "marks": 1, "maxMarks": 2, "feedback": "Mentions X but not Y."}
]

Only include the JSON array, no other text and no markdown code fences."#;

/// System instruction for question generation asking for `count` questions.
pub fn generation_system_prompt(count: usize) -> String {
    GENERATION_SYSTEM_PROMPT.replace("{count}", &count.to_string())
}

/// Render documents as one prompt block, preserving input order.
pub fn format_documents(documents: &[Document]) -> String {
    let mut out = String::new();
    out.push_str(DOCUMENTS_OPENING);
    out.push_str("\n\n");

    for doc in documents {
        out.push_str(&format!("### {}\n", doc.path));
        out.push_str(&doc.content);
        out.push_str("\n\n");
    }

    out.push_str(DOCUMENTS_CLOSING);
    out
}

/// User prompt for grading: the source text followed by numbered questions
/// with their resolved weights and answers.
pub fn grading_user_prompt(source_text: &str, answered: &[AnsweredQuestion]) -> String {
    let mut out = String::new();
    out.push_str("Source material:\n");
    out.push_str(source_text);
    out.push_str("\n\nQuestions and answers:\n");

    for (i, item) in answered.iter().enumerate() {
        let weight = item.question.weight();
        let answer = item.answer.trim();
        let answer = if answer.is_empty() {
            NO_ANSWER_MARKER
        } else {
            answer
        };

        let unit = if weight == 1 { "mark" } else { "marks" };
        out.push_str(&format!(
            "\nQuestion {} (max {weight} {unit}): {}\nAnswer: {answer}\n",
            i + 1,
            item.question.text,
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::types::{Question, QuestionKind};

    #[test]
    fn test_format_documents_preserves_order() {
        let docs = vec![
            Document::new("z.md", "Zeta content"),
            Document::new("a.md", "Alpha content"),
        ];

        let prompt = format_documents(&docs);

        assert!(prompt.starts_with(DOCUMENTS_OPENING));
        assert!(prompt.ends_with(DOCUMENTS_CLOSING));
        let z = prompt.find("### z.md").unwrap();
        let a = prompt.find("### a.md").unwrap();
        assert!(z < a);
        assert!(prompt.contains("### z.md\nZeta content"));
    }

    #[test]
    fn test_format_documents_is_deterministic() {
        let docs = vec![Document::new("a.md", "Alpha")];
        assert_eq!(format_documents(&docs), format_documents(&docs));
    }

    #[test]
    fn test_format_documents_empty() {
        let prompt = format_documents(&[]);
        assert_eq!(prompt, format!("{DOCUMENTS_OPENING}\n\n{DOCUMENTS_CLOSING}"));
    }

    #[test]
    fn test_generation_prompt_substitutes_count() {
        let prompt = generation_system_prompt(7);
        assert!(prompt.contains("Write 7 questions"));
        assert!(!prompt.contains("{count}"));
    }

    #[test]
    fn test_grading_prompt_embeds_weights_and_answers() {
        let answered = vec![
            AnsweredQuestion::new(
                Question::new("Define osmosis. (1)", Some(QuestionKind::Extended)),
                "Water moving across a membrane",
            ),
            AnsweredQuestion::new(
                Question::new("Explain diffusion.", Some(QuestionKind::Long)),
                "   ",
            ),
        ];

        let prompt = grading_user_prompt("Cells and membranes.", &answered);

        assert!(prompt.starts_with("Source material:\nCells and membranes."));
        assert!(prompt.contains(
            "Question 1 (max 1 mark): Define osmosis. (1)\nAnswer: Water moving across a membrane"
        ));
        assert!(prompt.contains(
            "Question 2 (max 2 marks): Explain diffusion.\nAnswer: (no answer provided)"
        ));
    }
}
