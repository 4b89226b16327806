//! Shared record types for extracted tables and verdicts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cast::CellValue;

/// Fixed boolean factor columns every extracted table must report.
///
/// L1–L5 track the five statutory exclusion clauses; the remaining four are
/// recurring case factors (accomplices, foreign nationals, settlement,
/// victim considerations).
pub const BASE_COLS: &[&str] = &[
    "L1",
    "L2",
    "L3",
    "L4",
    "L5",
    "涉及共犯",
    "涉及外國人",
    "和解",
    "被害人考量",
];

/// The typed result of parsing one raw table.
///
/// `bool_columns` always carries exactly the [`BASE_COLS`] key set; cells
/// that are missing or not parseable as TRUE/FALSE resolve to `false`.
/// `extra_columns` carries every non-base header cell of the document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedRecord {
    pub bool_columns: BTreeMap<String, bool>,
    pub extra_columns: BTreeMap<String, CellValue>,
}

impl ParsedRecord {
    /// A record with every base column present and `false`.
    pub fn with_base(base_columns: &[&str]) -> Self {
        Self {
            bool_columns: base_columns
                .iter()
                .map(|c| (c.to_string(), false))
                .collect(),
            extra_columns: BTreeMap::new(),
        }
    }
}

/// Final boolean decision plus free-text rationale for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub decision: bool,
    pub rationale: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_base_pre_fills_all_columns_false() {
        let record = ParsedRecord::with_base(BASE_COLS);
        assert_eq!(record.bool_columns.len(), BASE_COLS.len());
        assert!(record.bool_columns.values().all(|v| !v));
        assert!(record.extra_columns.is_empty());
    }

    #[test]
    fn verdict_json_roundtrip() {
        let v = Verdict {
            decision: true,
            rationale: "因涉及共犯與被害人因素".into(),
        };
        let json = serde_json::to_string(&v).unwrap();
        let parsed: Verdict = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, v);
    }
}
