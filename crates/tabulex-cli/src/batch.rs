//! CSV batch input/output over Arrow RecordBatches.
//!
//! Input: one row per ruling, title in the `裁定字號` column, ruling text in
//! `reasoning`. Output: the original columns for every succeeded row, the
//! base factor columns as booleans, one `<name>_value`/`<name>_type` pair
//! per registry factor (null where that document never reported it), then
//! `verdict` and `reason`.

use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use arrow::array::{Array, ArrayRef, BooleanArray, LargeStringArray, StringArray, UInt32Array};
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use tabulex_core::{BASE_COLS, FactorRegistry};
use tabulex_pipeline::{CaseOutcome, CaseResult, Document};

pub const TITLE_COLUMN: &str = "裁定字號";
pub const TEXT_COLUMN: &str = "reasoning";

const SCHEMA_SAMPLE_ROWS: usize = 1000;

/// Read a CSV file into a single RecordBatch with an inferred schema.
pub fn read_csv(path: &Path) -> anyhow::Result<RecordBatch> {
    let mut file =
        File::open(path).with_context(|| format!("opening {}", path.display()))?;

    let format = Format::default().with_header(true);
    let (schema, _) = format
        .infer_schema(&mut file, Some(SCHEMA_SAMPLE_ROWS))
        .context("inferring CSV schema")?;
    file.rewind()?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .build(file)?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;

    arrow::compute::concat_batches(&schema, &batches).context("concatenating CSV batches")
}

/// Write a RecordBatch out as CSV with a header row.
pub fn write_csv(path: &Path, batch: &RecordBatch) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer.write(batch)?;
    Ok(())
}

/// Turn batch rows into pipeline documents. Document ids are row indices,
/// which is what re-joins outcomes to source rows at output time.
pub fn documents_from_batch(batch: &RecordBatch) -> anyhow::Result<Vec<Document>> {
    let text_col = batch
        .column_by_name(TEXT_COLUMN)
        .with_context(|| format!("input CSV is missing the '{TEXT_COLUMN}' column"))?;
    let title_col = batch.column_by_name(TITLE_COLUMN);

    Ok((0..batch.num_rows())
        .map(|row| Document {
            id: row.to_string(),
            title: title_col
                .and_then(|col| get_string(col.as_ref(), row))
                .unwrap_or_else(|| format!("case-{row}")),
            text: get_string(text_col.as_ref(), row).unwrap_or_default(),
        })
        .collect())
}

/// Build the output batch: succeeded source rows (via `take`) plus the
/// extracted factor columns and the verdict.
pub fn assemble_output(
    source: &RecordBatch,
    outcomes: &[CaseOutcome],
    registry: &FactorRegistry,
) -> anyhow::Result<RecordBatch> {
    let done: Vec<(u32, &CaseResult)> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            CaseOutcome::Done(result) => Some((result.id.parse().ok()?, result)),
            _ => None,
        })
        .collect();

    let indices = UInt32Array::from(done.iter().map(|(row, _)| *row).collect::<Vec<_>>());

    let mut fields: Vec<Field> = source
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    let mut columns: Vec<ArrayRef> = source
        .columns()
        .iter()
        .map(|col| arrow::compute::take(col.as_ref(), &indices, None))
        .collect::<Result<_, _>>()
        .context("selecting succeeded rows")?;

    for name in BASE_COLS {
        let values: Vec<bool> = done
            .iter()
            .map(|(_, r)| r.record.bool_columns.get(*name).copied().unwrap_or(false))
            .collect();
        fields.push(Field::new(*name, DataType::Boolean, false));
        columns.push(Arc::new(BooleanArray::from(values)));
    }

    for factor in registry.iter() {
        let values: Vec<Option<String>> = done
            .iter()
            .map(|(_, r)| r.record.extra_columns.get(factor).map(|v| v.render()))
            .collect();
        let kinds: Vec<Option<String>> = done
            .iter()
            .map(|(_, r)| {
                r.record
                    .extra_columns
                    .get(factor)
                    .map(|v| v.kind().to_string())
            })
            .collect();
        fields.push(Field::new(format!("{factor}_value"), DataType::Utf8, true));
        columns.push(Arc::new(StringArray::from(values)));
        fields.push(Field::new(format!("{factor}_type"), DataType::Utf8, true));
        columns.push(Arc::new(StringArray::from(kinds)));
    }

    let verdicts: Vec<bool> = done.iter().map(|(_, r)| r.verdict.decision).collect();
    fields.push(Field::new("verdict", DataType::Boolean, false));
    columns.push(Arc::new(BooleanArray::from(verdicts)));

    let reasons: Vec<String> = done
        .iter()
        .map(|(_, r)| r.verdict.rationale.clone())
        .collect();
    fields.push(Field::new("reason", DataType::Utf8, false));
    columns.push(Arc::new(StringArray::from(reasons)));

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .context("assembling output batch")
}

/// Extract a string value from an Arrow array (handles Utf8 and LargeUtf8).
fn get_string(col: &dyn Array, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(|arr| arr.value(row).to_string())
        .or_else(|| {
            col.as_any()
                .downcast_ref::<LargeStringArray>()
                .map(|arr| arr.value(row).to_string())
        })
}
