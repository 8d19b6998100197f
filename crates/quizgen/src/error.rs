//! Error types for quizgen

use thiserror::Error;

use crate::provider::ProviderKind;

/// Main error type for quizgen operations
#[derive(Error, Debug)]
pub enum QuizError {
    /// A cloud provider was selected but no API key is configured
    #[error("No API key configured for {provider}. Add one to your settings before generating.")]
    MissingCredentials { provider: ProviderKind },

    /// The provider rejected the prompt as too large for the model
    #[error("Context length exceeded: {message}. Try selecting fewer or shorter documents.")]
    ContextLengthExceeded { message: String },

    /// Non-success HTTP response from a provider
    #[error("Provider returned HTTP {status}: {message}")]
    ProviderHttp {
        status: u16,
        message: String,
        body: String,
    },

    /// The model's output could not be parsed, even after repair
    #[error("Could not parse the model response ({reason}). A more capable model may help.")]
    UnparseableResponse { reason: String, raw: String },

    /// The local model server refused the connection
    #[error("Cannot reach the local model server at {url}: {message}. Is it running?")]
    ProviderUnreachable { url: String, message: String },

    /// A provider call failed for a reason other than the ones surfaced directly
    #[error("{provider} request with model '{model}' failed: {source}")]
    ProviderCallFailed {
        provider: ProviderKind,
        model: String,
        #[source]
        source: Box<QuizError>,
    },

    /// Transport-level failure (DNS, TLS, timeout, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A success response did not have the expected shape
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// No adapter is registered for the requested provider
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document store errors
    #[error("Document error: {0}")]
    Document(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuizError {
    /// The innermost error, looking through `ProviderCallFailed` wrappers.
    pub fn root_cause(&self) -> &QuizError {
        match self {
            QuizError::ProviderCallFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn is_context_length(&self) -> bool {
        matches!(self.root_cause(), QuizError::ContextLengthExceeded { .. })
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self.root_cause(), QuizError::ProviderUnreachable { .. })
    }
}

/// Result type alias for quizgen operations
pub type Result<T> = std::result::Result<T, QuizError>;
