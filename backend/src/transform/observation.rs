//! Schema-drift observations.
//!
//! A missing column never stops the pipeline. The stage that needed it
//! degrades and records what it gave up, so the driver can report it.

use serde::Serialize;
use std::fmt;

use crate::models::DatasetKind;

/// What a stage did because a column was missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "camelCase")]
pub enum DegradedEffect {
    /// The rule kept every row on this axis.
    FilterSkipped { rule: &'static str },
    /// One alternative of the rule could not be evaluated and never matches.
    ConditionIgnored { rule: &'static str },
    /// A derived subset could not be computed and is empty.
    SubsetEmpty { subset: &'static str },
    /// A vocabulary could not be computed and is empty.
    VocabularyEmpty { vocabulary: &'static str },
}

/// A column a stage expected but did not find.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub dataset: DatasetKind,
    pub column: String,
    #[serde(flatten)]
    pub effect: DegradedEffect,
}

impl Observation {
    pub fn new(dataset: DatasetKind, column: impl Into<String>, effect: DegradedEffect) -> Self {
        Self {
            dataset,
            column: column.into(),
            effect,
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Column {} not found in {}: ", self.column, self.dataset)?;
        match &self.effect {
            DegradedEffect::FilterSkipped { rule } => {
                write!(f, "{} filter not applied, all rows kept", rule)
            }
            DegradedEffect::ConditionIgnored { rule } => {
                write!(f, "{} filter evaluated without it", rule)
            }
            DegradedEffect::SubsetEmpty { subset } => write!(f, "no {} extracted", subset),
            DegradedEffect::VocabularyEmpty { vocabulary } => {
                write!(f, "no {} vocabulary generated", vocabulary)
            }
        }
    }
}
