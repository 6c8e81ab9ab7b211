//! Inventory report.
//!
//! The report is plain data: a header and an ordered list of sections,
//! each a list of `(label, count)` pairs. Sections whose input is absent
//! or empty are omitted; the others are still computed. Text rendering
//! happens only in [`InventoryReport::render`].

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::{columns, Table};

/// Report title.
pub const REPORT_TITLE: &str = "STATISTICS REPORT - ARCAD IBM i INVENTORY";

const TOP_APPLICATIONS: usize = 10;
const TOP_ATTRIBUTES: usize = 15;
const RULE_WIDTH: usize = 60;

/// Which statistic a section holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    Totals,
    Applications,
    ObjectTypes,
    Attributes,
    SourceTypes,
    CrossReferenceShapes,
}

impl SectionKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Totals => "GENERAL STATISTICS",
            Self::Applications => "OBJECTS BY APPLICATION",
            Self::ObjectTypes => "OBJECT TYPES",
            Self::Attributes => "OBJECT ATTRIBUTES",
            Self::SourceTypes => "SOURCE TYPES",
            Self::CrossReferenceShapes => "CROSS-REFERENCE TYPES",
        }
    }
}

/// One `(label, count)` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub label: String,
    pub count: usize,
}

impl ReportEntry {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self { label: label.into(), count }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSection {
    pub kind: SectionKind,
    pub title: String,
    /// Appended after each count when rendered (`APP1: 12 objects`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub entries: Vec<ReportEntry>,
}

impl ReportSection {
    fn new(kind: SectionKind, entries: Vec<ReportEntry>) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            unit: None,
            entries,
        }
    }

    fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    /// Count of the entry with this label.
    pub fn count(&self, label: &str) -> Option<usize> {
        self.entries.iter().find(|e| e.label == label).map(|e| e.count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub title: String,
    pub generated_at: NaiveDateTime,
    pub sections: Vec<ReportSection>,
}

/// Datasets the report is computed from; `None` means not available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportInput<'a> {
    pub sources: Option<&'a Table>,
    pub objects: Option<&'a Table>,
    pub cross_references: Option<&'a Table>,
}

/// Build the report.
pub fn build_report(input: &ReportInput<'_>, generated_at: NaiveDateTime) -> InventoryReport {
    let len = |t: Option<&Table>| t.map_or(0, Table::len);
    let mut sections = vec![ReportSection::new(
        SectionKind::Totals,
        vec![
            ReportEntry::new("Sources", len(input.sources)),
            ReportEntry::new("Objects", len(input.objects)),
            ReportEntry::new("Cross-references", len(input.cross_references)),
        ],
    )];

    if let Some(objects) = input.objects.filter(|t| !t.is_empty()) {
        if let Some(mut apps) = value_counts(objects, columns::APPLICATION) {
            apps.truncate(TOP_APPLICATIONS);
            sections.push(ReportSection::new(SectionKind::Applications, apps).with_unit("objects"));
        }
        if let Some(types) = value_counts(objects, columns::TYPE) {
            sections.push(ReportSection::new(SectionKind::ObjectTypes, types));
        }
        if let Some(mut attrs) = value_counts(objects, columns::ATTRIBUTE) {
            attrs.truncate(TOP_ATTRIBUTES);
            sections.push(ReportSection::new(SectionKind::Attributes, attrs));
        }
    }

    if let Some(sources) = input.sources.filter(|t| !t.is_empty()) {
        if let Some(types) = value_counts(sources, columns::TYPE) {
            sections.push(ReportSection::new(SectionKind::SourceTypes, types));
        }
    }

    if let Some(xref) = input.cross_references.filter(|t| !t.is_empty()) {
        if let Some(shapes) = shape_counts(xref) {
            sections.push(ReportSection::new(SectionKind::CrossReferenceShapes, shapes));
        }
    }

    InventoryReport {
        title: REPORT_TITLE.to_string(),
        generated_at,
        sections,
    }
}

/// Frequency of each value of `column`, descending; ties keep first-seen order.
///
/// `None` when the column is absent.
pub fn value_counts(table: &Table, column: &str) -> Option<Vec<ReportEntry>> {
    let column = table.column(column);
    if !column.is_present() {
        return None;
    }

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<ReportEntry> = Vec::new();
    for row in table.rows() {
        let value = column.get(row).text().unwrap_or_default();
        match index.get(&value) {
            Some(&i) => entries[i].count += 1,
            None => {
                index.insert(value.clone(), entries.len());
                entries.push(ReportEntry::new(value, 1));
            }
        }
    }

    // sort_by is stable
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    Some(entries)
}

/// Count of each `(from type, to type)` pair, ordered by pair.
fn shape_counts(xref: &Table) -> Option<Vec<ReportEntry>> {
    let from = xref.column(columns::XREF_FROM_TYPE);
    let to = xref.column(columns::XREF_TO_TYPE);
    if !from.is_present() || !to.is_present() {
        return None;
    }

    let mut shapes: BTreeMap<(String, String), usize> = BTreeMap::new();
    for row in xref.rows() {
        let key = (
            from.get(row).text().unwrap_or_default(),
            to.get(row).text().unwrap_or_default(),
        );
        *shapes.entry(key).or_default() += 1;
    }

    Some(
        shapes
            .into_iter()
            .map(|((f, t), count)| ReportEntry::new(format!("{} -> {}", f, t), count))
            .collect(),
    )
}

impl InventoryReport {
    pub fn section(&self, kind: SectionKind) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Render as plain text.
    pub fn render(&self) -> String {
        let mut lines = vec![
            self.title.clone(),
            format!("Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S")),
            "=".repeat(RULE_WIDTH),
            String::new(),
        ];

        for section in &self.sections {
            lines.push(format!("=== {} ===", section.title));
            for entry in &section.entries {
                let unit = section.unit.as_deref().map(|u| format!(" {}", u)).unwrap_or_default();
                lines.push(format!("{}: {}{}", entry.label, format_count(entry.count), unit));
            }
            lines.push(String::new());
        }

        lines.join("\n")
    }
}

/// `1234567` -> `1,234,567`
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::from_rows(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| CellValue::from(*v)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_value_counts_descending_with_stable_ties() {
        let t = table(
            &["LST_CTYPE"],
            &[&["*FILE"], &["*PGM"], &["*DTAARA"], &["*PGM"], &["*FILE"], &["*MSGF"]],
        );
        let counts = value_counts(&t, "LST_CTYPE").unwrap();
        let labels: Vec<_> = counts.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["*FILE", "*PGM", "*DTAARA", "*MSGF"]);
        assert_eq!(counts[0].count, 2);
        assert!(value_counts(&t, "LST_CATR").is_none());
    }

    #[test]
    fn test_totals_and_sections() {
        let objects = table(
            &["LST_CELTTY", "LST_CTYPE", "LST_CATR", "LST_CAPP"],
            &[&["O", "*PGM", "", "APP1"], &["O", "*FILE", "PF", "APP1"]],
        );
        let report = build_report(
            &ReportInput { objects: Some(&objects), ..Default::default() },
            at(),
        );

        let totals = report.section(SectionKind::Totals).unwrap();
        assert_eq!(totals.count("Objects"), Some(2));
        assert_eq!(totals.count("Sources"), Some(0));
        assert_eq!(
            report.section(SectionKind::Applications).unwrap().count("APP1"),
            Some(2)
        );
        assert!(report.section(SectionKind::SourceTypes).is_none());
        assert!(report.section(SectionKind::CrossReferenceShapes).is_none());
    }

    #[test]
    fn test_top_n_truncation() {
        let rows: Vec<Vec<CellValue>> = (0..20)
            .map(|i| vec![CellValue::text(format!("V{:02}", i)); 2])
            .collect();
        let objects = Table::from_rows(vec!["LST_CAPP".into(), "LST_CATR".into()], rows);
        let report = build_report(
            &ReportInput { objects: Some(&objects), ..Default::default() },
            at(),
        );
        assert_eq!(report.section(SectionKind::Applications).unwrap().entries.len(), 10);
        assert_eq!(report.section(SectionKind::Attributes).unwrap().entries.len(), 15);
        assert_eq!(report.section(SectionKind::Attributes).unwrap().entries[0].label, "V00");
    }

    #[test]
    fn test_missing_column_omits_only_its_section() {
        let objects = table(&["LST_CELTTY", "LST_CTYPE"], &[&["O", "*PGM"]]);
        let report = build_report(
            &ReportInput { objects: Some(&objects), ..Default::default() },
            at(),
        );
        assert!(report.section(SectionKind::ObjectTypes).is_some());
        assert!(report.section(SectionKind::Applications).is_none());
        assert!(report.section(SectionKind::Attributes).is_none());
    }

    #[test]
    fn test_shape_counts() {
        let xref = table(
            &["OXR_FROM_TYPE", "OXR_TO_TYPE"],
            &[&["*PGM", "*PGM"], &["*PGM", "*FILE"], &["*PGM", "*FILE"]],
        );
        let sources = table(&["LST_CTYPE"], &[&["RPGLE"], &["CLLE"], &["RPGLE"]]);
        let report = build_report(
            &ReportInput {
                sources: Some(&sources),
                cross_references: Some(&xref),
                objects: None,
            },
            at(),
        );

        let shapes = report.section(SectionKind::CrossReferenceShapes).unwrap();
        assert_eq!(shapes.entries[0], ReportEntry::new("*PGM -> *FILE", 2));
        assert_eq!(shapes.entries[1], ReportEntry::new("*PGM -> *PGM", 1));
        assert_eq!(
            report.section(SectionKind::SourceTypes).unwrap().entries[0],
            ReportEntry::new("RPGLE", 2)
        );
        assert!(report.section(SectionKind::ObjectTypes).is_none());
    }

    #[test]
    fn test_render() {
        let objects = table(&["LST_CAPP"], &[&["APP1"], &["APP1"]]);
        let report = build_report(
            &ReportInput { objects: Some(&objects), ..Default::default() },
            at(),
        );
        let text = report.render();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], REPORT_TITLE);
        assert_eq!(lines[1], "Generated: 2025-03-01 09:30:00");
        assert_eq!(lines[2], "=".repeat(60));
        assert!(lines.contains(&"=== GENERAL STATISTICS ==="));
        assert!(lines.contains(&"Objects: 2"));
        assert!(lines.contains(&"APP1: 2 objects"));
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }
}
