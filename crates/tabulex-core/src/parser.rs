//! Tolerant parser for LLM-emitted single-row markdown tables.
//!
//! The generator is non-deterministic, so the table arrives wrapped in an
//! unknown amount of prose, with markdown separator decoration and border
//! pipes. The parser isolates the header and the sole data row, casts every
//! cell, and splits the result into the fixed boolean base columns and the
//! dynamically discovered extras. Malformed output is a named error, never
//! an index panic.

use thiserror::Error;
use tracing::debug;

use crate::cast::{CellValue, auto_cast};
use crate::record::ParsedRecord;
use crate::registry::FactorRegistry;

/// A table row needs at least this many `|` delimiters to count.
const MIN_DELIMITERS: usize = 2;

#[derive(Debug, Error)]
pub enum TableError {
    #[error(
        "expected a markdown table with a header row and one data row, \
         found {found} qualifying line(s)"
    )]
    MalformedTable { found: usize },
}

/// Parse raw table markdown into a [`ParsedRecord`].
///
/// `base_columns` cells are coerced to bool: `TRUE` → `true`, anything
/// else (FALSE, missing, prose, numbers) → `false`. That conflates
/// "explicitly false" with "unparseable" on purpose — it is the original
/// policy this system is compatible with, not a correctness guarantee.
///
/// Every non-base header cell lands in `extra_columns` and its name is
/// unioned into `registry` so later documents in the batch can be prompted
/// to reuse it.
pub fn parse_table(
    raw_markdown: &str,
    base_columns: &[&str],
    registry: &mut FactorRegistry,
) -> Result<ParsedRecord, TableError> {
    let rows: Vec<&str> = raw_markdown
        .lines()
        .map(str::trim)
        .filter(|line| is_table_row(line))
        .collect();

    if rows.len() < 2 {
        return Err(TableError::MalformedTable { found: rows.len() });
    }

    let headers = split_cells(rows[0]);
    let values = split_cells(rows[1]);
    debug!(
        headers = headers.len(),
        values = values.len(),
        "parsing table rows"
    );

    let mut record = ParsedRecord::with_base(base_columns);
    for (name, raw_value) in headers.iter().zip(values.iter()) {
        let cast = auto_cast(raw_value);
        if base_columns.contains(&name.as_str()) {
            record
                .bool_columns
                .insert(name.clone(), cast == CellValue::Bool(true));
        } else {
            record.extra_columns.insert(name.clone(), cast);
        }
    }

    registry.extend(record.extra_columns.keys().cloned());
    Ok(record)
}

/// A data-bearing table line: starts with `|`, has enough delimiters, and
/// is not a `|---|:---:|` separator row.
fn is_table_row(line: &str) -> bool {
    line.starts_with('|')
        && line.matches('|').count() >= MIN_DELIMITERS
        && !is_separator_row(line)
}

fn is_separator_row(line: &str) -> bool {
    line.chars()
        .all(|c| matches!(c, '|' | '-' | ':') || c.is_whitespace())
}

/// Split a table row on `|`, trim each cell, and drop the empty leading and
/// trailing cells produced by markdown border pipes.
fn split_cells(line: &str) -> Vec<String> {
    let mut cells: Vec<String> = line.split('|').map(|c| c.trim().to_string()).collect();
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}
