use tracing::info;

use crate::document::Document;
use crate::error::Result;
use crate::parser::parse_question_set;
use crate::prompt::{format_documents, generation_system_prompt};
use crate::provider::ProviderConfig;
use crate::quiz::QuizService;
use crate::quiz::types::QuestionSet;

impl QuizService {
    /// Generate a question set from `documents` with the given provider.
    ///
    /// Fails with `MissingCredentials` before any request when a cloud
    /// provider has no key, `ContextLengthExceeded` when the notes do not
    /// fit the model, and `UnparseableResponse` when the output cannot be
    /// recovered. Other provider failures come back as `ProviderCallFailed`.
    pub async fn generate(
        &self,
        documents: &[Document],
        config: &ProviderConfig,
    ) -> Result<QuestionSet> {
        let system = generation_system_prompt(self.options.question_count);
        let user = format_documents(documents);

        let raw = self
            .dispatch(config, &system, &user, self.options.generation_max_tokens)
            .await?;
        let set = parse_question_set(&raw)?;

        info!(
            provider = %config.provider,
            documents = documents.len(),
            questions = set.questions.len(),
            "Generated question set"
        );
        Ok(set)
    }
}
