use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use quizgen::{
    AnsweredQuestion, Config, DocumentStore, GradeResult, ProviderKind, QuestionSet, QuizService,
    ScoreSummary,
};

use crate::commands::generate::file_store;
use crate::commands::resolve_provider;
use crate::error::CliResult;
use crate::output::{OutputFormat, format_marks, spinner, truncate_string};
use crate::quiz_file::QuizFile;

#[derive(Parser)]
pub struct GradeCommand {
    #[clap(help = "Quiz file written by `generate --out`")]
    pub quiz_file: PathBuf,

    #[clap(long, short, help = "JSON array of answers, one string per question")]
    pub answers: Option<PathBuf>,

    #[clap(long, short, default_value = "1", help = "Question set to grade (1-based)")]
    pub set: usize,

    #[clap(long, short, help = "Provider (defaults to the one that generated the quiz)")]
    pub provider: Option<ProviderKind>,

    #[clap(long, short, help = "Model identifier (defaults to the one that generated the quiz)")]
    pub model: Option<String>,
}

impl GradeCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> CliResult<()> {
        let quiz = QuizFile::load(&self.quiz_file)?;
        let set = quiz.set(self.set)?;
        if set.questions.is_empty() {
            return Err(format!("Set {} has no questions", self.set).into());
        }

        let source_text = read_sources(&quiz, self.set)?;

        let answers = match &self.answers {
            Some(path) => read_answers_file(path)?,
            None => prompt_answers(set)?,
        };
        let answered = pair_answers(set, answers)?;

        let service = QuizService::from_config(config)?;
        let provider = self.provider.unwrap_or(quiz.provider);
        let model = self
            .model
            .as_deref()
            .or((provider == quiz.provider).then_some(quiz.model.as_str()));
        let call = resolve_provider(config, Some(provider), model);

        let message = format!(
            "Grading {} answer(s) with {}",
            answered.len(),
            call.provider
        );
        let pb = spinner(format, message);
        let result = service.grade(&source_text, &answered, &call).await;
        pb.finish_and_clear();
        let results = result?;

        let summary = ScoreSummary::from_results(&results);

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "set": self.set,
                    "results": results,
                    "earned": summary.earned,
                    "max": summary.max,
                    "percentage": summary.percentage,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => print_results(&answered, &results, &summary),
        }

        Ok(())
    }
}

fn print_results(answered: &[AnsweredQuestion], results: &[GradeResult], summary: &ScoreSummary) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["#", "Question", "Marks", "Feedback"]);

    for result in results {
        let question = answered
            .get(result.question_index)
            .map(|a| truncate_string(&a.question.text, 60))
            .unwrap_or_else(|| "-".to_string());
        table.add_row([
            (result.question_index + 1).to_string(),
            question,
            format!("{} / {}", trim_float(result.earned_marks), trim_float(result.max_marks)),
            result.feedback.clone(),
        ]);
    }

    println!("{table}");
    println!(
        "\nScore: {} / {} ({:.1}%)",
        trim_float(summary.earned),
        format_marks(summary.max),
        summary.percentage
    );
}

fn trim_float(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Concatenated content of the notes behind a set, re-read from disk.
fn read_sources(quiz: &QuizFile, set: usize) -> CliResult<String> {
    let sources = quiz.sources_for(set);
    if sources.is_empty() {
        return Err("Quiz file lists no source notes".into());
    }

    let mut text = String::new();
    for path in sources {
        let (store, name) = file_store(path)?;
        let content = store
            .read(&name)
            .map_err(|e| format!("Failed to re-read source {}: {e}", path.display()))?;
        if !text.is_empty() {
            text.push_str("\n\n");
        }
        text.push_str(&format!("### {}\n{}", path.display(), content));
    }
    Ok(text)
}

fn read_answers_file(path: &Path) -> CliResult<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read answers file {}: {e}", path.display()))?;
    let answers: Vec<String> = serde_json::from_str(&content)?;
    Ok(answers)
}

/// Ask for each answer on stdin; an empty line leaves the question blank.
fn prompt_answers(set: &QuestionSet) -> CliResult<Vec<String>> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut stdout = std::io::stdout();
    let mut answers = Vec::with_capacity(set.questions.len());

    if !set.description.is_empty() {
        println!("{}\n", set.description);
    }

    for (i, question) in set.questions.iter().enumerate() {
        println!(
            "Question {} ({}): {}",
            i + 1,
            format_marks(f64::from(question.weight())),
            question.text
        );
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        input.read_line(&mut line)?;
        answers.push(line.trim().to_string());
        println!();
    }

    Ok(answers)
}

/// Pair answers with questions in order; missing trailing answers are blank.
fn pair_answers(set: &QuestionSet, answers: Vec<String>) -> CliResult<Vec<AnsweredQuestion>> {
    if answers.len() > set.questions.len() {
        return Err(format!(
            "Got {} answers for {} questions",
            answers.len(),
            set.questions.len()
        )
        .into());
    }

    let mut answers = answers.into_iter();
    Ok(set
        .questions
        .iter()
        .map(|q| AnsweredQuestion::new(q.clone(), answers.next().unwrap_or_default()))
        .collect())
}
