pub mod commands;
pub mod error;
pub mod output;
pub mod quiz_file;

pub use commands::{ConfigCommand, GenerateCommand, GradeCommand};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, format_marks, spinner, truncate_string};
pub use quiz_file::QuizFile;
