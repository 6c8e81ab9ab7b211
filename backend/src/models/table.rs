//! Tabular model shared by every pipeline stage.
//!
//! A [`Table`] keeps its column order stable and stores rows positionally,
//! so a filtered table always carries the exact columns of its input.
//! Columns are looked up through [`Column`], which makes "this export has no
//! such column" an explicit value instead of a failure.

use chrono::NaiveDateTime;

/// A single cell, as decoded from a CSV file or a workbook.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Text cell from anything string-like.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Borrow the text content, if this is a text cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Render the cell the way it is written to CSV.
    pub fn render(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", *f as i64)
            }
            Self::Float(f) => f.to_string(),
            Self::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_string())
        }
    }
}

// =============================================================================
// Optional column access
// =============================================================================

/// A column resolved against a table's header.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Column exists at this position.
    Present(usize),
    /// Column is missing from the export.
    Absent(String),
}

impl Column {
    /// Read this column from a row.
    pub fn get<'a>(&self, row: &'a [CellValue]) -> Field<'a> {
        match self {
            Column::Present(idx) => row.get(*idx).map_or(Field::Absent, Field::Present),
            Column::Absent(_) => Field::Absent,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Column::Present(_))
    }
}

/// Value of an optional column in one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    Present(&'a CellValue),
    Absent,
}

impl<'a> Field<'a> {
    /// Rendered text of the field, `None` if the column is absent.
    pub fn text(&self) -> Option<String> {
        match self {
            Field::Present(value) => Some(value.render()),
            Field::Absent => None,
        }
    }

    /// Whether the field is present and equal to `expected`.
    pub fn equals(&self, expected: &str) -> Option<bool> {
        self.text().map(|t| t == expected)
    }

    /// Whether the field is present and one of `allowed`.
    pub fn is_one_of(&self, allowed: &[&str]) -> Option<bool> {
        self.text().map(|t| allowed.contains(&t.as_str()))
    }
}

// =============================================================================
// Table
// =============================================================================

/// Ordered columns and positional rows.
///
/// Every row holds exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Empty table with the given header.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from a header and rows; short rows are padded with
    /// [`CellValue::Empty`], extra cells are dropped.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Resolve a column by name.
    pub fn column(&self, name: &str) -> Column {
        match self.columns.iter().position(|c| c == name) {
            Some(idx) => Column::Present(idx),
            None => Column::Absent(name.to_string()),
        }
    }

    /// Keep the rows matching `keep`, preserving order and all columns.
    pub fn filter_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Apply `f` to every cell of one column in place.
    pub fn map_column<F>(&mut self, name: &str, mut f: F)
    where
        F: FnMut(&CellValue) -> CellValue,
    {
        if let Column::Present(idx) = self.column(name) {
            for row in &mut self.rows {
                row[idx] = f(&row[idx]);
            }
        }
    }

    /// Apply `f` to every cell in place.
    pub fn map_cells<F>(&mut self, mut f: F)
    where
        F: FnMut(&CellValue) -> CellValue,
    {
        for cell in self.rows.iter_mut().flatten() {
            *cell = f(cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec!["A".into(), "B".into()],
            vec![
                vec!["1".into(), "x".into()],
                vec!["2".into()],
                vec!["3".into(), "z".into(), "extra".into()],
            ],
        )
    }

    #[test]
    fn test_rows_are_squared_to_header() {
        let t = sample();
        assert!(t.rows().iter().all(|r| r.len() == 2));
        assert_eq!(t.rows()[1][1], CellValue::Empty);
    }

    #[test]
    fn test_absent_column_yields_absent_field() {
        let t = sample();
        let col = t.column("MISSING");
        assert!(!col.is_present());
        assert_eq!(col.get(&t.rows()[0]), Field::Absent);
        assert_eq!(col.get(&t.rows()[0]).equals("x"), None);
    }

    #[test]
    fn test_filter_keeps_columns_and_order() {
        let t = sample();
        let b = t.column("A");
        let filtered = t.filter_rows(|row| b.get(row).equals("2") != Some(true));
        assert_eq!(filtered.columns(), t.columns());
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.rows()[0][0], CellValue::text("1"));
        assert_eq!(filtered.rows()[1][0], CellValue::text("3"));
    }

    #[test]
    fn test_render() {
        assert_eq!(CellValue::Float(20230115.0).render(), "20230115");
        assert_eq!(CellValue::Float(1.5).render(), "1.5");
        assert_eq!(CellValue::Int(42).render(), "42");
        assert_eq!(CellValue::Empty.render(), "");
    }
}
