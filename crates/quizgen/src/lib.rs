//! quizgen - quiz generation and grading over multiple LLM providers
//!
//! This crate turns a set of notes into a weighted question set and grades
//! free-text answers against the same notes. Requests go to OpenAI,
//! Anthropic, DeepSeek, Gemini, Mistral or a local Ollama server through a
//! single [`ProviderAdapter`](provider::ProviderAdapter) contract, and
//! model output is parsed leniently into typed results.

pub mod config;
pub mod document;
pub mod error;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod quiz;
pub mod testing;

pub use config::Config;
pub use document::{Document, DocumentStore, FsDocumentStore};
pub use error::{QuizError, Result};
pub use provider::{ProviderConfig, ProviderKind};
pub use quiz::{
    AnsweredQuestion, GradeResult, Question, QuestionKind, QuestionSet, QuizOptions, QuizService,
    ScoreSummary,
};
