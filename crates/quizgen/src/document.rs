//! Documents and the store they are read from
//!
//! The quiz core only ever reads documents. `DocumentStore` is the seam a
//! host application plugs its own storage into; `FsDocumentStore` serves a
//! directory of notes from disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{QuizError, Result};

/// File extensions treated as notes
pub const NOTE_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// A source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Store-relative identifier, shown to the model as the document header
    pub path: String,
    pub content: String,
}

impl Document {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Read-only key to text lookup
pub trait DocumentStore: Send + Sync {
    /// All documents in the store, in a stable order
    fn list_documents(&self) -> Result<Vec<Document>>;

    /// Content of a single document
    fn read(&self, path: &str) -> Result<String>;
}

/// Document store backed by a directory tree
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_note(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| NOTE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(QuizError::Document(format!(
                "Path '{path}' escapes the document root"
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl DocumentStore for FsDocumentStore {
    fn list_documents(&self) -> Result<Vec<Document>> {
        let mut documents = Vec::new();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                QuizError::Document(format!(
                    "Failed to walk {}: {}",
                    self.root.display(),
                    e
                ))
            })?;

            if !entry.file_type().is_file() || !Self::is_note(entry.path()) {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            let content = fs::read_to_string(entry.path())?;
            documents.push(Document::new(relative, content));
        }

        debug!(
            "Listed {} documents under {}",
            documents.len(),
            self.root.display()
        );
        Ok(documents)
    }

    fn read(&self, path: &str) -> Result<String> {
        let full = self.resolve(path)?;
        fs::read_to_string(&full).map_err(|e| {
            QuizError::Document(format!("Failed to read {}: {}", full.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_list_documents_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.md", "Beta");
        write(dir.path(), "a.md", "Alpha");
        write(dir.path(), "nested/c.txt", "Gamma");
        write(dir.path(), "image.png", "not a note");

        let store = FsDocumentStore::new(dir.path());
        let docs = store.list_documents().unwrap();

        let paths: Vec<&str> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["a.md", "b.md", "nested/c.txt"]);
        assert_eq!(docs[0].content, "Alpha");
    }

    #[test]
    fn test_read_relative_path() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "notes/bio.md", "Photosynthesis converts light to energy.");

        let store = FsDocumentStore::new(dir.path());
        let content = store.read("notes/bio.md").unwrap();
        assert_eq!(content, "Photosynthesis converts light to energy.");
    }

    #[test]
    fn test_read_rejects_parent_traversal() {
        let dir = TempDir::new().unwrap();
        let store = FsDocumentStore::new(dir.path());

        let err = store.read("../secret.md").unwrap_err();
        assert!(err.to_string().contains("escapes"));
    }

    #[test]
    fn test_read_missing_document() {
        let dir = TempDir::new().unwrap();
        let store = FsDocumentStore::new(dir.path());

        let err = store.read("missing.md").unwrap_err();
        assert!(matches!(err, QuizError::Document(_)));
    }
}
