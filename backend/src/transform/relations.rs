//! Relationship filter.
//!
//! Restricts cross-references to the two edge shapes of the graph model:
//! `(:Program)-[:CALLS]->(:Program)` and `(:Program)-[:USES]->(:Table)`.
//! Rows keep every original column; only rows are dropped.

use serde::Serialize;

use super::classify::{classify_cross_references, Classified, FILE, PGM};
use crate::models::{columns, CellValue, Column, Table};

/// Edge shape of a retained cross-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    /// `*PGM -> *PGM`
    Calls,
    /// `*PGM -> *FILE`
    Uses,
}

impl RelationKind {
    /// Shape of one row, if it is a supported one.
    pub fn of(from: &Column, to: &Column, row: &[CellValue]) -> Option<Self> {
        if from.get(row).equals(PGM) != Some(true) {
            return None;
        }
        match to.get(row).text().as_deref() {
            Some(PGM) => Some(Self::Calls),
            Some(FILE) => Some(Self::Uses),
            _ => None,
        }
    }
}

/// Keep program calls and program-to-file usages, in input order.
pub fn filter_relations(cross_references: &Table) -> Classified {
    classify_cross_references(cross_references)
}

/// Number of `(calls, uses)` edges in a filtered cross-reference table.
pub fn relation_counts(relations: &Table) -> (usize, usize) {
    let from = relations.column(columns::XREF_FROM_TYPE);
    let to = relations.column(columns::XREF_TO_TYPE);

    relations
        .rows()
        .iter()
        .fold((0, 0), |(calls, uses), row| match RelationKind::of(&from, &to, row) {
            Some(RelationKind::Calls) => (calls + 1, uses),
            Some(RelationKind::Uses) => (calls, uses + 1),
            None => (calls, uses),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xref(rows: &[(&str, &str)]) -> Table {
        Table::from_rows(
            vec![
                "OXR_FROM_TYPE".into(),
                "OXR_FROM_OBJ".into(),
                "OXR_TO_TYPE".into(),
                "OXR_TO_OBJ".into(),
            ],
            rows.iter()
                .enumerate()
                .map(|(i, (from, to))| {
                    vec![
                        CellValue::from(*from),
                        CellValue::text(format!("SRC{}", i)),
                        CellValue::from(*to),
                        CellValue::text(format!("DST{}", i)),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn test_filter_preserves_order_and_columns() {
        let input = xref(&[
            ("*PGM", "*FILE"),
            ("*PGM", "*DTAARA"),
            ("*PGM", "*PGM"),
            ("*PGM", "*FILE"),
        ]);
        let out = filter_relations(&input);

        assert_eq!(out.table.columns(), input.columns());
        let to_obj = out.table.column("OXR_TO_OBJ");
        let names: Vec<_> = out
            .table
            .rows()
            .iter()
            .filter_map(|r| to_obj.get(r).text())
            .collect();
        assert_eq!(names, ["DST0", "DST2", "DST3"]);
    }

    #[test]
    fn test_relation_counts() {
        let filtered = filter_relations(&xref(&[
            ("*PGM", "*PGM"),
            ("*PGM", "*FILE"),
            ("*PGM", "*FILE"),
            ("*FILE", "*FILE"),
        ]));
        assert_eq!(relation_counts(&filtered.table), (1, 2));
    }

    #[test]
    fn test_kind_of_unsupported_shape() {
        let t = xref(&[("*PGM", "*MSGF")]);
        let (from, to) = (t.column("OXR_FROM_TYPE"), t.column("OXR_TO_TYPE"));
        assert_eq!(RelationKind::of(&from, &to, &t.rows()[0]), None);
    }
}
