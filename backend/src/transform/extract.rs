//! Entity extraction from the classified object table.
//!
//! Programs and tables are row subsets of the objects (same columns).
//! Vocabularies are the distinct non-blank values of one object column,
//! in order of first appearance, each with a generated description.

use std::collections::HashSet;

use serde::Serialize;

use super::classify::{FILE, PGM};
use super::observation::{DegradedEffect, Observation};
use crate::models::{columns, DatasetKind, Table};

/// Object attributes that denote a table.
pub const TABLE_ATTRIBUTES: &[&str] = &["PF", "TABLE"];

// =============================================================================
// Vocabularies
// =============================================================================

/// The controlled vocabularies derived from the objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VocabularyKind {
    Application,
    IbmiType,
    ArcadType,
    Attribute,
}

impl VocabularyKind {
    pub const ALL: [VocabularyKind; 4] =
        [Self::Application, Self::IbmiType, Self::ArcadType, Self::Attribute];

    /// Object column the values come from.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Application => columns::APPLICATION,
            Self::IbmiType => columns::TYPE,
            Self::ArcadType => columns::ARCAD_TYPE,
            Self::Attribute => columns::ATTRIBUTE,
        }
    }

    /// Header of the value column in the output table.
    pub fn key_header(&self) -> &'static str {
        match self {
            Self::Application => "name",
            Self::IbmiType | Self::ArcadType => "type_name",
            Self::Attribute => "attr_name",
        }
    }

    /// Prefix of the generated description.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Application => "Application",
            Self::IbmiType => "IBM-i type",
            Self::ArcadType => "ARCAD type",
            Self::Attribute => "Attribute",
        }
    }

    /// Output file name expected by the graph import script.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Application => "applications.csv",
            Self::IbmiType => "types_ibmi.csv",
            Self::ArcadType => "types_arcad.csv",
            Self::Attribute => "attributs.csv",
        }
    }

    fn plural(&self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::IbmiType => "IBM-i type",
            Self::ArcadType => "ARCAD type",
            Self::Attribute => "attribute",
        }
    }
}

/// One controlled value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VocabularyEntry {
    pub value: String,
    pub description: String,
}

/// Distinct values of one object column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vocabulary {
    pub kind: VocabularyKind,
    pub entries: Vec<VocabularyEntry>,
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.value.as_str())
    }
}

/// Build a vocabulary; an absent column yields an empty one plus an observation.
pub fn extract_vocabulary(objects: &Table, kind: VocabularyKind) -> (Vocabulary, Option<Observation>) {
    let column = objects.column(kind.column());
    if !column.is_present() {
        let observation = Observation::new(
            DatasetKind::Objects,
            kind.column(),
            DegradedEffect::VocabularyEmpty { vocabulary: kind.plural() },
        );
        return (Vocabulary { kind, entries: Vec::new() }, Some(observation));
    }

    let mut seen = HashSet::new();
    let entries = objects
        .rows()
        .iter()
        .filter_map(|row| column.get(row).text())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty() && seen.insert(value.clone()))
        .map(|value| VocabularyEntry {
            description: format!("{} {}", kind.label(), value),
            value,
        })
        .collect();

    (Vocabulary { kind, entries }, None)
}

// =============================================================================
// Subsets
// =============================================================================

/// Objects of type `*PGM`.
pub fn extract_programs(objects: &Table) -> (Table, Vec<Observation>) {
    let ty = objects.column(columns::TYPE);
    if !ty.is_present() {
        return (
            Table::new(objects.columns().to_vec()),
            vec![subset_empty(columns::TYPE, "programs")],
        );
    }
    (objects.filter_rows(|row| ty.get(row).equals(PGM) == Some(true)), Vec::new())
}

/// Objects of type `*FILE` with a table attribute (`PF`, `TABLE`).
pub fn extract_tables(objects: &Table) -> (Table, Vec<Observation>) {
    let ty = objects.column(columns::TYPE);
    let attr = objects.column(columns::ATTRIBUTE);

    let missing: Vec<Observation> = [columns::TYPE, columns::ATTRIBUTE]
        .into_iter()
        .filter(|c| !objects.has_column(c))
        .map(|c| subset_empty(c, "tables"))
        .collect();
    if !missing.is_empty() {
        return (Table::new(objects.columns().to_vec()), missing);
    }

    let tables = objects.filter_rows(|row| {
        ty.get(row).equals(FILE) == Some(true)
            && attr.get(row).is_one_of(TABLE_ATTRIBUTES) == Some(true)
    });
    (tables, Vec::new())
}

fn subset_empty(column: &str, subset: &'static str) -> Observation {
    Observation::new(DatasetKind::Objects, column, DegradedEffect::SubsetEmpty { subset })
}

// =============================================================================
// All entities
// =============================================================================

/// Everything derived from the objects.
#[derive(Debug, Clone)]
pub struct Entities {
    pub programs: Table,
    pub tables: Table,
    pub applications: Vocabulary,
    pub ibmi_types: Vocabulary,
    pub arcad_types: Vocabulary,
    pub attributes: Vocabulary,
    pub observations: Vec<Observation>,
}

impl Entities {
    /// The four vocabularies in output order.
    pub fn vocabularies(&self) -> [&Vocabulary; 4] {
        [&self.applications, &self.ibmi_types, &self.arcad_types, &self.attributes]
    }
}

/// Derive programs, tables and the vocabularies from classified objects.
pub fn extract_entities(objects: &Table) -> Entities {
    let mut observations = Vec::new();

    let (programs, obs) = extract_programs(objects);
    observations.extend(obs);
    let (tables, obs) = extract_tables(objects);
    observations.extend(obs);

    let [applications, ibmi_types, arcad_types, attributes] = VocabularyKind::ALL.map(|kind| {
        let (vocabulary, obs) = extract_vocabulary(objects, kind);
        observations.extend(obs);
        vocabulary
    });

    Entities {
        programs,
        tables,
        applications,
        ibmi_types,
        arcad_types,
        attributes,
        observations,
    }
}
