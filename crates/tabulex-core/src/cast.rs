//! Typed cell values and the tolerant cast applied to raw table cells.
//!
//! The upstream table is LLM-generated free text, so every cell goes through
//! [`auto_cast`] which maps it onto a small tagged union instead of trusting
//! the model to emit consistent types. Cast order matters: placeholder →
//! bool → number → date → text, first match wins.

use chrono::NaiveDate;

/// A typed table cell.
///
/// `Int` and `Float` are distinct variants but share the `number` kind;
/// the decimal point in the raw text decides which one is used.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Blank cell or a pure dash/underscore placeholder.
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
}

impl CellValue {
    /// Kind tag used in output columns: one of
    /// `empty`, `bool`, `number`, `date`, `text`.
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Bool(_) => "bool",
            CellValue::Int(_) | CellValue::Float(_) => "number",
            CellValue::Date(_) => "date",
            CellValue::Text(_) => "text",
        }
    }

    /// Render the value as output text. `Empty` uses the `NA` sentinel.
    pub fn render(&self) -> String {
        match self {
            CellValue::Empty => "NA".to_string(),
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
            CellValue::Int(n) => n.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// The boolean payload, if this cell is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Cast a raw cell string to a [`CellValue`].
///
/// - blank, or only `-`/`_` characters → `Empty`
/// - `TRUE`/`FALSE` (case-insensitive) → `Bool`
/// - numeric text → `Float` if it contains a decimal point, else `Int`
/// - ISO calendar date (`%Y-%m-%d`) → `Date`
/// - anything else → `Text` (trimmed)
pub fn auto_cast(raw: &str) -> CellValue {
    let s = raw.trim();
    if s.is_empty() || s.chars().all(|c| c == '-' || c == '_') {
        return CellValue::Empty;
    }

    if s.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }

    if s.contains('.') {
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
    } else if let Ok(n) = s.parse::<i64>() {
        return CellValue::Int(n);
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return CellValue::Date(d);
    }

    CellValue::Text(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casts_true_false() {
        assert_eq!(auto_cast("TRUE"), CellValue::Bool(true));
        assert_eq!(auto_cast("true"), CellValue::Bool(true));
        assert_eq!(auto_cast("False"), CellValue::Bool(false));
        assert_eq!(auto_cast("  FALSE  "), CellValue::Bool(false));
    }

    #[test]
    fn casts_empty_and_placeholders() {
        assert_eq!(auto_cast(""), CellValue::Empty);
        assert_eq!(auto_cast("  "), CellValue::Empty);
        assert_eq!(auto_cast("-"), CellValue::Empty);
        assert_eq!(auto_cast("---"), CellValue::Empty);
        assert_eq!(auto_cast("_"), CellValue::Empty);
        assert_eq!(auto_cast(" -_- "), CellValue::Empty);
    }

    #[test]
    fn casts_numbers() {
        assert_eq!(auto_cast("42"), CellValue::Int(42));
        assert_eq!(auto_cast("-7"), CellValue::Int(-7));
        assert_eq!(auto_cast("3.5"), CellValue::Float(3.5));
        assert_eq!(auto_cast("0.0"), CellValue::Float(0.0));
    }

    #[test]
    fn casts_dates() {
        assert_eq!(
            auto_cast("2024-01-05"),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
        );
    }

    #[test]
    fn invalid_date_falls_back_to_text() {
        assert_eq!(
            auto_cast("2024-13-99"),
            CellValue::Text("2024-13-99".to_string())
        );
    }

    #[test]
    fn casts_text() {
        assert_eq!(auto_cast("foo"), CellValue::Text("foo".to_string()));
        assert_eq!(auto_cast("日本"), CellValue::Text("日本".to_string()));
        // Trimmed before storing.
        assert_eq!(auto_cast("  bar  "), CellValue::Text("bar".to_string()));
    }

    #[test]
    fn malformed_number_is_text() {
        assert_eq!(
            auto_cast("3.5.1"),
            CellValue::Text("3.5.1".to_string())
        );
    }

    #[test]
    fn kinds() {
        assert_eq!(auto_cast("").kind(), "empty");
        assert_eq!(auto_cast("TRUE").kind(), "bool");
        assert_eq!(auto_cast("42").kind(), "number");
        assert_eq!(auto_cast("3.5").kind(), "number");
        assert_eq!(auto_cast("2024-01-05").kind(), "date");
        assert_eq!(auto_cast("foo").kind(), "text");
    }

    #[test]
    fn renders_values() {
        assert_eq!(auto_cast("-").render(), "NA");
        assert_eq!(auto_cast("true").render(), "TRUE");
        assert_eq!(auto_cast("42").render(), "42");
        assert_eq!(auto_cast("2024-01-05").render(), "2024-01-05");
        assert_eq!(auto_cast("日本").render(), "日本");
    }
}
