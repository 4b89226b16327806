//! Storage layer: persisted raw-table markdown artifacts and prompt templates.

mod error;
mod table_store;
mod template;

pub use error::StoreError;
pub use table_store::TableStore;
pub use template::PromptTemplate;
