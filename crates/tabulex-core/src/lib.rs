pub mod cast;
pub mod parser;
pub mod record;
pub mod registry;

pub use cast::{CellValue, auto_cast};
pub use parser::{TableError, parse_table};
pub use record::{BASE_COLS, ParsedRecord, Verdict};
pub use registry::FactorRegistry;
