use std::path::{Path, PathBuf};

use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use quizgen::{
    Config, Document, DocumentStore, FsDocumentStore, ProviderKind, QuestionSet, QuizService,
};

use crate::commands::resolve_provider;
use crate::error::CliResult;
use crate::output::{OutputFormat, format_marks, spinner};
use crate::quiz_file::QuizFile;

#[derive(Parser)]
pub struct GenerateCommand {
    #[clap(required = true, help = "Note files or directories of notes")]
    pub paths: Vec<PathBuf>,

    #[clap(long, short, help = "Provider (openai, anthropic, deepseek, gemini, mistral, ollama)")]
    pub provider: Option<ProviderKind>,

    #[clap(long, short, help = "Model identifier (defaults to the configured model)")]
    pub model: Option<String>,

    #[clap(long, short = 'n', help = "Number of questions per set")]
    pub count: Option<usize>,

    #[clap(long, help = "Generate a separate question set for each document")]
    pub per_document: bool,

    #[clap(long, short, help = "Save the quiz to this file for grading later")]
    pub out: Option<PathBuf>,
}

impl GenerateCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> CliResult<()> {
        let mut config = config.clone();
        if let Some(count) = self.count {
            if count == 0 {
                return Err("--count must be at least 1".into());
            }
            config.quiz.question_count = count;
        }

        let (sources, documents) = load_documents(&self.paths)?;
        if documents.is_empty() {
            return Err("No notes found (looked for .md, .markdown and .txt files)".into());
        }

        let service = QuizService::from_config(&config)?;
        let call = resolve_provider(&config, self.provider, self.model.as_deref());

        let pb = spinner(
            format,
            format!(
                "Generating questions from {} document(s) with {} ({})",
                documents.len(),
                call.provider,
                call.model
            ),
        );

        let sets = if self.per_document {
            let results = futures::future::join_all(
                documents
                    .iter()
                    .map(|doc| service.generate(std::slice::from_ref(doc), &call)),
            )
            .await;
            pb.finish_and_clear();
            results.into_iter().collect::<Result<Vec<_>, _>>()?
        } else {
            let result = service.generate(&documents, &call).await;
            pb.finish_and_clear();
            vec![result?]
        };

        let quiz = QuizFile {
            provider: call.provider,
            model: call.model.clone(),
            sources,
            per_document: self.per_document,
            sets,
        };

        if let Some(out) = &self.out {
            quiz.save(out)?;
            tracing::info!("Saved quiz to {}", out.display());
        }

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&quiz)?);
            }
            OutputFormat::Table => {
                for (i, set) in quiz.sets.iter().enumerate() {
                    if quiz.sets.len() > 1 {
                        println!("Set {}", i + 1);
                    }
                    print_set(set);
                }
                if let Some(out) = &self.out {
                    println!("Saved to {}", out.display());
                    println!("Grade with: quizgen grade {}", out.display());
                }
            }
        }

        Ok(())
    }
}

fn print_set(set: &QuestionSet) {
    if !set.description.is_empty() {
        println!("{}", set.description);
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["#", "Question", "Type", "Marks"]);

    for (i, question) in set.questions.iter().enumerate() {
        table.add_row([
            (i + 1).to_string(),
            question.text.clone(),
            question.kind.map_or("-", |k| k.as_str()).to_string(),
            format_marks(f64::from(question.weight())),
        ]);
    }

    let total: u32 = set.questions.iter().map(|q| u32::from(q.weight())).sum();
    println!("{table}");
    println!("Total: {} questions, {}\n", set.questions.len(), format_marks(f64::from(total)));
}

/// Read every note under `paths`.
///
/// Files are read as given; directories are walked for notes. Returns the
/// on-disk path of each document alongside it, in the same order.
pub(crate) fn load_documents(paths: &[PathBuf]) -> CliResult<(Vec<PathBuf>, Vec<Document>)> {
    let mut sources = Vec::new();
    let mut documents = Vec::new();

    for path in paths {
        if path.is_dir() {
            let store = FsDocumentStore::new(path);
            for doc in store.list_documents()? {
                sources.push(path.join(&doc.path));
                documents.push(doc);
            }
        } else if path.is_file() {
            let (store, name) = file_store(path)?;
            let content = store.read(&name)?;
            sources.push(path.clone());
            documents.push(Document::new(path.to_string_lossy().replace('\\', "/"), content));
        } else {
            return Err(format!("No such file or directory: {}", path.display()).into());
        }
    }

    Ok((sources, documents))
}

/// Store rooted at the file's directory, plus the file's name within it
pub(crate) fn file_store(path: &Path) -> CliResult<(FsDocumentStore, String)> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| format!("Not a file: {}", path.display()))?;
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    Ok((FsDocumentStore::new(parent), name))
}
