//! Pipeline layer: table extraction, verdict inference, batch orchestration.

mod error;
mod extractor;
mod orchestrator;
mod verdict;

pub use error::PipelineError;
pub use extractor::TableExtractor;
pub use orchestrator::{BatchOrchestrator, CaseOutcome, CaseResult, CaseState, Document};
pub use verdict::{DEFAULT_QUERY, STATUTE_TEXT, VerdictEngine};

/// Retry budget applied to transient model faults.
pub const DEFAULT_RETRIES: u32 = 3;

/// All LLM calls run at temperature 0.0: low-variance intent, not a
/// determinism guarantee.
pub const TEMPERATURE: f32 = 0.0;

pub const MAX_TOKENS: u32 = 2048;
