//! Per-cell cleanup applied before classification.
//!
//! Text cells are trimmed; the ARCAD modification date is rewritten to
//! ISO `YYYY-MM-DD`. Neither step can fail: an unusable date becomes an
//! empty string and the row is kept.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{columns, CellValue, DatasetKind, Table};

/// Integer-like text, optionally with a zero fraction (`20230115`, `20230115.0`).
static INTEGER_LIKE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^([0-9]+)(?:\.0*)?$").ok());

/// Text form of a cell, whitespace stripped; empty for a missing value.
pub fn normalize_text(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Text(s) => s.trim().to_string(),
        other => other.render().trim().to_string(),
    }
}

/// ARCAD date to `YYYY-MM-DD`.
///
/// Accepts a date/time cell, an 8-digit `YYYYMMDD` value or a 6-digit
/// `YYMMDD` value (assumed 20YY). Missing, zero or any other shape
/// yields an empty string.
pub fn normalize_date(value: &CellValue) -> String {
    let digits = match value {
        CellValue::Empty => return String::new(),
        CellValue::DateTime(dt) => return dt.format("%Y-%m-%d").to_string(),
        CellValue::Int(i) if *i > 0 => i.to_string(),
        CellValue::Float(f) if f.is_finite() && *f >= 1.0 => format!("{}", f.trunc() as i64),
        CellValue::Text(s) => match INTEGER_LIKE.as_ref().and_then(|re| re.captures(s.trim())) {
            Some(caps) => caps[1].trim_start_matches('0').to_string(),
            None => return String::new(),
        },
        _ => return String::new(),
    };

    match digits.len() {
        8 => format!("{}-{}-{}", &digits[..4], &digits[4..6], &digits[6..8]),
        6 => format!("20{}-{}-{}", &digits[..2], &digits[2..4], &digits[4..6]),
        _ => String::new(),
    }
}

/// Clean a raw dataset.
///
/// Every text cell is trimmed (blank cells become [`CellValue::Empty`]);
/// numeric and date cells keep their type. For the listing datasets the
/// `LST_TDATE` column is converted with [`normalize_date`].
pub fn normalize_dataset(mut table: Table, kind: DatasetKind) -> Table {
    table.map_cells(|cell| match cell {
        CellValue::Text(_) | CellValue::Empty => text_cell(normalize_text(cell)),
        other => other.clone(),
    });

    if kind != DatasetKind::CrossReferences {
        table.map_column(columns::DATE, |cell| text_cell(normalize_date(cell)));
    }

    table
}

fn text_cell(value: String) -> CellValue {
    if value.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(value)
    }
}
