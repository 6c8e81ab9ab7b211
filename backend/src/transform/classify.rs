//! Record classification rules.
//!
//! Each dataset has one rule. A rule is a conjunction of *axes*; an axis is
//! a disjunction of *terms*; a term tests one column against a set of
//! accepted values. Terms read columns through [`Column`], so a missing
//! column is a third outcome rather than an error:
//!
//! | term result | column present, value accepted | present, not accepted | absent |
//! |-------------|--------------------------------|-----------------------|--------|
//! | [`Verdict`] | `Match`                        | `Miss`                | `Unknown` |
//!
//! Every axis names the columns it is *guarded* by. When a guard column is
//! absent the axis keeps every row. Otherwise the axis keeps a row only if
//! some term is a `Match`; an absent non-guard column never matches.

use std::collections::HashSet;

use super::observation::{DegradedEffect, Observation};
use crate::models::{columns, CellValue, Column, DatasetKind, Table};

/// Source types that denote compilable program source.
pub const PROGRAM_SOURCE_TYPES: &[&str] =
    &["RPG", "RPGLE", "SQLRPG", "SQLRPGLE", "CLP", "CLLE", "CBL"];

/// Source files holding DDS and SQL table definitions.
pub const TABLE_SOURCE_FILES: &[&str] = &["QDDSSRC", "QSQLSRC"];

/// Element type marker of a source member row.
pub const MEMBER: &str = "M";
/// Element type marker of an object row.
pub const OBJECT: &str = "O";

pub const PGM: &str = "*PGM";
pub const FILE: &str = "*FILE";

/// Outcome of evaluating a term or an axis on one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Miss,
    Unknown,
}

impl Verdict {
    fn from_check(check: Option<bool>) -> Self {
        match check {
            Some(true) => Verdict::Match,
            Some(false) => Verdict::Miss,
            None => Verdict::Unknown,
        }
    }

    /// Disjunction where `Unknown` is neutral.
    pub fn or(self, other: Verdict) -> Verdict {
        match (self, other) {
            (Verdict::Match, _) | (_, Verdict::Match) => Verdict::Match,
            (Verdict::Miss, _) | (_, Verdict::Miss) => Verdict::Miss,
            _ => Verdict::Unknown,
        }
    }
}

/// One column tested against accepted values.
#[derive(Debug, Clone, Copy)]
pub struct Term {
    pub column: &'static str,
    pub accepted: &'static [&'static str],
}

/// Alternatives of a rule, skipped as a whole when a guard column is absent.
#[derive(Debug, Clone, Copy)]
pub struct Axis {
    pub guards: &'static [&'static str],
    pub terms: &'static [Term],
}

/// Per-dataset classification rule.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub dataset: DatasetKind,
    pub axes: &'static [Axis],
}

/// Source members with analyzable source text.
///
/// The kind axis only depends on `LST_CTYPE`: without it every member is
/// kept, without `LST_JSRCF` the source-file alternative never matches.
pub const SOURCE_RULE: Rule = Rule {
    name: "source",
    dataset: DatasetKind::Sources,
    axes: &[
        Axis {
            guards: &[columns::ELEMENT_TYPE],
            terms: &[Term { column: columns::ELEMENT_TYPE, accepted: &[MEMBER] }],
        },
        Axis {
            guards: &[columns::TYPE],
            terms: &[
                Term { column: columns::TYPE, accepted: PROGRAM_SOURCE_TYPES },
                Term { column: columns::SOURCE_FILE, accepted: TABLE_SOURCE_FILES },
                Term { column: columns::TYPE, accepted: &[FILE] },
            ],
        },
    ],
};

/// Deployed objects, as opposed to member bookkeeping rows.
pub const OBJECT_RULE: Rule = Rule {
    name: "object",
    dataset: DatasetKind::Objects,
    axes: &[Axis {
        guards: &[columns::ELEMENT_TYPE],
        terms: &[Term { column: columns::ELEMENT_TYPE, accepted: &[OBJECT] }],
    }],
};

const XREF_TYPES: &[&str] = &[columns::XREF_FROM_TYPE, columns::XREF_TO_TYPE];

/// Program-to-program calls and program-to-file usages.
///
/// Both type columns are needed; if either is missing nothing is filtered.
pub const CROSS_REFERENCE_RULE: Rule = Rule {
    name: "cross-reference",
    dataset: DatasetKind::CrossReferences,
    axes: &[
        Axis {
            guards: XREF_TYPES,
            terms: &[Term { column: columns::XREF_FROM_TYPE, accepted: &[PGM] }],
        },
        Axis {
            guards: XREF_TYPES,
            terms: &[Term { column: columns::XREF_TO_TYPE, accepted: &[PGM, FILE] }],
        },
    ],
};

/// Filtered table plus what had to be given up.
#[derive(Debug, Clone)]
pub struct Classified {
    pub table: Table,
    pub observations: Vec<Observation>,
}

/// A rule bound to the columns of one table; skipped axes are dropped.
struct BoundRule {
    axes: Vec<Vec<(Column, &'static [&'static str])>>,
}

impl BoundRule {
    fn bind(rule: &Rule, table: &Table) -> Self {
        let axes = rule
            .axes
            .iter()
            .filter(|axis| axis.guards.iter().all(|g| table.has_column(g)))
            .map(|axis| {
                axis.terms
                    .iter()
                    .map(|t| (table.column(t.column), t.accepted))
                    .collect()
            })
            .collect();
        Self { axes }
    }

    fn keeps(&self, row: &[CellValue]) -> bool {
        self.axes.iter().all(|terms| {
            let verdict = terms.iter().fold(Verdict::Unknown, |acc, (column, accepted)| {
                acc.or(Verdict::from_check(column.get(row).is_one_of(accepted)))
            });
            verdict == Verdict::Match
        })
    }
}

/// Observations for the columns of `rule` missing from `table`.
fn drift(rule: &Rule, table: &Table) -> Vec<Observation> {
    let mut seen = HashSet::new();
    let mut observations = Vec::new();

    for axis in rule.axes {
        let skipped = axis.guards.iter().any(|g| !table.has_column(g));
        let columns = axis.guards.iter().copied().chain(axis.terms.iter().map(|t| t.column));
        for column in columns {
            if table.has_column(column) || !seen.insert(column) {
                continue;
            }
            let effect = if skipped {
                DegradedEffect::FilterSkipped { rule: rule.name }
            } else {
                DegradedEffect::ConditionIgnored { rule: rule.name }
            };
            observations.push(Observation::new(rule.dataset, column, effect));
        }
    }

    observations
}

/// Apply a rule row by row. Never fails.
pub fn apply_rule(rule: &Rule, table: &Table) -> Classified {
    let bound = BoundRule::bind(rule, table);
    Classified {
        table: table.filter_rows(|row| bound.keeps(row)),
        observations: drift(rule, table),
    }
}

/// Keep source members of program or table source.
pub fn classify_sources(table: &Table) -> Classified {
    apply_rule(&SOURCE_RULE, table)
}

/// Keep object rows.
pub fn classify_objects(table: &Table) -> Classified {
    apply_rule(&OBJECT_RULE, table)
}

/// Keep the cross-reference shapes the graph model supports.
pub fn classify_cross_references(table: &Table) -> Classified {
    apply_rule(&CROSS_REFERENCE_RULE, table)
}
