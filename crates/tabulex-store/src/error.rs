use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("artifact not found: {}", .0.display())]
    NotFound(std::path::PathBuf),

    #[error("template {} is missing required slot {{{slot}}}", .path.display())]
    MissingSlot { path: std::path::PathBuf, slot: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
