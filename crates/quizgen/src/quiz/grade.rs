use tracing::info;

use crate::error::Result;
use crate::parser::parse_grade_results;
use crate::prompt::{GRADING_SYSTEM_PROMPT, grading_user_prompt};
use crate::provider::ProviderConfig;
use crate::quiz::QuizService;
use crate::quiz::score::ScoreSummary;
use crate::quiz::types::{AnsweredQuestion, GradeResult};

impl QuizService {
    /// Grade answers against the source they were generated from.
    ///
    /// Same failure modes as [`generate`](Self::generate). Results come back
    /// in the order the model lists them.
    pub async fn grade(
        &self,
        source_text: &str,
        answered: &[AnsweredQuestion],
        config: &ProviderConfig,
    ) -> Result<Vec<GradeResult>> {
        let user = grading_user_prompt(source_text, answered);

        let raw = self
            .dispatch(
                config,
                GRADING_SYSTEM_PROMPT,
                &user,
                self.options.grading_max_tokens,
            )
            .await?;
        let results = parse_grade_results(&raw)?;

        let summary = ScoreSummary::from_results(&results);
        info!(
            provider = %config.provider,
            questions = answered.len(),
            graded = results.len(),
            earned = summary.earned,
            max = summary.max,
            "Graded answers"
        );
        Ok(results)
    }
}
