//! Table extraction: one LLM call per document, persisted as markdown.

use std::sync::Arc;

use tabulex_core::FactorRegistry;
use tabulex_llm::{ChatModel, Message, complete_with_retry};
use tabulex_store::{PromptTemplate, TableStore};
use tracing::info;

use crate::error::PipelineError;
use crate::{MAX_TOKENS, TEMPERATURE};

pub struct TableExtractor {
    model: Arc<dyn ChatModel>,
    store: TableStore,
    template: PromptTemplate,
    retries: u32,
}

impl TableExtractor {
    pub fn new(
        model: Arc<dyn ChatModel>,
        store: TableStore,
        template: PromptTemplate,
        retries: u32,
    ) -> Self {
        Self {
            model,
            store,
            template,
            retries,
        }
    }

    /// Build the table-construction prompt, call the model once, and persist
    /// the raw reply keyed by `data_id` (overwriting any prior artifact).
    ///
    /// Returns the first line of the reply for logging only — parsing must
    /// re-read the persisted artifact.
    pub async fn extract(
        &self,
        document_text: &str,
        data_id: &str,
        known_factors: &FactorRegistry,
    ) -> Result<String, PipelineError> {
        info!(data_id, known_factors = known_factors.len(), "building boolean table");

        let prompt = self.build_prompt(document_text, known_factors);
        let completion = complete_with_retry(
            self.model.as_ref(),
            &[Message::user(prompt)],
            TEMPERATURE,
            MAX_TOKENS,
            self.retries,
        )
        .await?;

        let table_md = completion.content.trim().to_string();
        self.store.save(data_id, &table_md)?;

        Ok(table_md.lines().next().unwrap_or_default().to_string())
    }

    /// Instruction template plus, when factors are already known, an advisory
    /// block biasing the model toward reusing existing column names. This is
    /// what keeps the dynamic schema from drifting per document.
    fn build_prompt(&self, document_text: &str, known_factors: &FactorRegistry) -> String {
        let mut prompt = self.template.render(&[("core", document_text.trim())]);
        if !known_factors.is_empty() {
            prompt.push_str("\n### Existing factors (已出現欄名，請優先沿用)\n");
            prompt.push_str(&known_factors.joined());
            prompt.push_str("\n若無相符再新增新欄。");
        }
        prompt
    }
}
