//! Saved quiz files
//!
//! `generate --out` writes one of these so `grade` can later re-read the
//! source notes and ask the same provider to mark the answers.

use std::path::{Path, PathBuf};

use quizgen::{ProviderKind, QuestionSet};
use serde::{Deserialize, Serialize};

use crate::error::CliResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizFile {
    pub provider: ProviderKind,
    pub model: String,
    /// Note files the questions were generated from
    pub sources: Vec<PathBuf>,
    /// When set, `sets[i]` was generated from `sources[i]` alone
    #[serde(default)]
    pub per_document: bool,
    pub sets: Vec<QuestionSet>,
}

impl QuizFile {
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read quiz file {}: {e}", path.display()))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> CliResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Question set by 1-based number
    pub fn set(&self, number: usize) -> CliResult<&QuestionSet> {
        number
            .checked_sub(1)
            .and_then(|i| self.sets.get(i))
            .ok_or_else(|| {
                format!(
                    "Quiz has {} question set(s); set {number} does not exist",
                    self.sets.len()
                )
                .into()
            })
    }

    /// Source files behind the given 1-based set
    pub fn sources_for(&self, number: usize) -> &[PathBuf] {
        if self.per_document {
            number
                .checked_sub(1)
                .and_then(|i| self.sources.get(i..=i))
                .unwrap_or(&[])
        } else {
            &self.sources
        }
    }
}
