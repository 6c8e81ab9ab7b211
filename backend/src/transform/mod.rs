//! Transformation module.
//!
//! This module turns raw ARCAD datasets into graph import tables:
//! - Normalize: cell cleanup and ARCAD date conversion
//! - Classify: per-dataset row selection rules
//! - Extract: programs, tables and vocabularies
//! - Relations: supported cross-reference shapes
//! - Pipeline: the stages chained together

pub mod classify;
pub mod extract;
pub mod normalize;
pub mod observation;
pub mod pipeline;
pub mod relations;

pub use classify::{classify_cross_references, classify_objects, classify_sources, Classified};
pub use extract::{extract_entities, Entities, Vocabulary, VocabularyEntry, VocabularyKind};
pub use normalize::{normalize_dataset, normalize_date, normalize_text};
pub use observation::{DegradedEffect, Observation};
pub use pipeline::{
    convert, log_summary, run, PipelineOptions, PipelineOutput, RawCounts, RawDatasets,
};
pub use relations::{filter_relations, RelationKind};
