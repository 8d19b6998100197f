use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

#[derive(Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// `1 mark` / `3 marks`
pub fn format_marks(marks: f64) -> String {
    let unit = if marks == 1.0 { "mark" } else { "marks" };
    if marks.fract() == 0.0 {
        format!("{marks:.0} {unit}")
    } else {
        format!("{marks:.1} {unit}")
    }
}

/// Spinner on stderr while waiting on a provider; hidden for JSON output.
pub fn spinner(format: OutputFormat, message: impl Into<String>) -> ProgressBar {
    if matches!(format, OutputFormat::Json) {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
