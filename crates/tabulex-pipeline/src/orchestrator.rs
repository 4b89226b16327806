//! Batch orchestration: extract → parse → infer per document, threading the
//! factor registry so the dynamic schema converges across documents.

use std::sync::Arc;

use tabulex_core::{BASE_COLS, FactorRegistry, ParsedRecord, Verdict, parse_table};
use tabulex_llm::ChatModel;
use tabulex_store::{PromptTemplate, TableStore};
use tracing::{error, info, warn};

use crate::DEFAULT_RETRIES;
use crate::error::PipelineError;
use crate::extractor::TableExtractor;
use crate::verdict::{DEFAULT_QUERY, STATUTE_TEXT, VerdictEngine};

/// One input document.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub text: String,
}

/// Where in the per-document pipeline a case currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseState {
    Pending,
    Extracted,
    Parsed,
    Verdicted,
}

/// Per-document aggregate for a completed case.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub id: String,
    pub title: String,
    pub record: ParsedRecord,
    pub verdict: Verdict,
}

/// Terminal outcome for one document in a batch.
#[derive(Debug)]
pub enum CaseOutcome {
    Done(CaseResult),
    /// Document text was blank; nothing to process.
    Skipped { id: String, title: String },
    /// The pipeline aborted at `state` with `error`; later documents still run.
    Failed {
        id: String,
        title: String,
        state: CaseState,
        error: PipelineError,
    },
}

pub struct BatchOrchestrator {
    extractor: TableExtractor,
    engine: VerdictEngine,
    store: TableStore,
    query: String,
    statute: String,
}

impl BatchOrchestrator {
    pub fn new(
        model: Arc<dyn ChatModel>,
        store: TableStore,
        table_template: PromptTemplate,
        verdict_template: PromptTemplate,
    ) -> Self {
        Self {
            extractor: TableExtractor::new(
                Arc::clone(&model),
                store.clone(),
                table_template,
                DEFAULT_RETRIES,
            ),
            engine: VerdictEngine::new(model, verdict_template, DEFAULT_RETRIES),
            store,
            query: DEFAULT_QUERY.to_string(),
            statute: STATUTE_TEXT.to_string(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_statute(mut self, statute: impl Into<String>) -> Self {
        self.statute = statute.into();
        self
    }

    /// Run a batch with a fresh registry.
    pub async fn run(&self, documents: &[Document]) -> Vec<CaseOutcome> {
        let mut registry = FactorRegistry::new();
        self.run_with_registry(documents, &mut registry).await
    }

    /// Run a batch, threading the caller's registry across documents in
    /// input order. Per-document failures are isolated; a credential
    /// failure aborts the remainder of the batch.
    pub async fn run_with_registry(
        &self,
        documents: &[Document],
        registry: &mut FactorRegistry,
    ) -> Vec<CaseOutcome> {
        let mut outcomes = Vec::with_capacity(documents.len());

        for doc in documents {
            if doc.text.trim().is_empty() {
                warn!(id = %doc.id, title = %doc.title, "blank document text, skipping");
                outcomes.push(CaseOutcome::Skipped {
                    id: doc.id.clone(),
                    title: doc.title.clone(),
                });
                continue;
            }

            match self.process(doc, registry).await {
                Ok(result) => {
                    info!(id = %doc.id, decision = result.verdict.decision, "case done");
                    outcomes.push(CaseOutcome::Done(result));
                }
                Err((state, err)) => {
                    let fatal = err.is_fatal();
                    warn!(id = %doc.id, state = ?state, error = %err, "case failed");
                    outcomes.push(CaseOutcome::Failed {
                        id: doc.id.clone(),
                        title: doc.title.clone(),
                        state,
                        error: err,
                    });
                    if fatal {
                        error!("credential failure, aborting batch");
                        break;
                    }
                }
            }
        }

        outcomes
    }

    /// Process a single document, surfacing the error directly.
    pub async fn run_one(
        &self,
        doc: &Document,
        registry: &mut FactorRegistry,
    ) -> Result<CaseResult, PipelineError> {
        self.process(doc, registry).await.map_err(|(_, err)| err)
    }

    /// Pending → Extracted → Parsed → Verdicted; any error aborts at the
    /// state it hit, leaving no partial result (only the overwritable table
    /// artifact remains on disk).
    async fn process(
        &self,
        doc: &Document,
        registry: &mut FactorRegistry,
    ) -> Result<CaseResult, (CaseState, PipelineError)> {
        let mut state = CaseState::Pending;

        self.extractor
            .extract(&doc.text, &doc.id, registry)
            .await
            .map_err(|e| (state, e))?;
        state = CaseState::Extracted;

        // Parse from the persisted artifact, not the in-flight reply.
        let raw_table = self
            .store
            .load(&doc.id)
            .map_err(|e| (state, PipelineError::Store(e)))?;
        let record =
            parse_table(&raw_table, BASE_COLS, registry).map_err(|e| (state, e.into()))?;
        state = CaseState::Parsed;

        let verdict = self
            .engine
            .infer(&self.query, &self.statute, &doc.text, &raw_table)
            .await
            .map_err(|e| (state, e))?;

        Ok(CaseResult {
            id: doc.id.clone(),
            title: doc.title.clone(),
            record,
            verdict,
        })
    }
}
