use tabulex_core::TableError;
use tabulex_llm::ModelError;
use tabulex_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Verdict reply was empty or whitespace-only — no token to parse.
    #[error("verdict reply was empty")]
    EmptyReply,
}

impl PipelineError {
    /// Credential failures abort the whole run, not just the document.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::Model(ModelError::Auth(_)))
    }
}
