//! CLI errors
//!
//! Library failures keep their `QuizError` so `main` can suggest a next
//! step for the ones a user can act on.

use quizgen::QuizError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Usage problems detected by the CLI itself
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// A suggested next step, when there is one.
    pub fn hint(&self) -> Option<&'static str> {
        let CliError::Quiz(err) = self else {
            return None;
        };

        match err.root_cause() {
            QuizError::ContextLengthExceeded { .. } => Some(
                "Pass fewer or shorter notes, or use --per-document to quiz each file separately.",
            ),
            QuizError::ProviderUnreachable { .. } => Some(
                "Start the server with `ollama serve`, or point [providers.ollama] base_url at it.",
            ),
            QuizError::UnparseableResponse { .. } => {
                Some("Try a larger model with --model, or ask for fewer questions with --count.")
            }
            QuizError::MissingCredentials { .. } => {
                Some("Run `quizgen config show` to see which API keys are missing.")
            }
            _ => None,
        }
    }
}

impl From<String> for CliError {
    fn from(s: String) -> Self {
        CliError::Usage(s)
    }
}

impl From<&str> for CliError {
    fn from(s: &str) -> Self {
        CliError::Usage(s.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;
