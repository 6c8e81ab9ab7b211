//! Domain models for the ARCAD conversion pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`Table`] - Ordered columns plus rows of [`CellValue`]s
//! - [`Column`] / [`Field`] - Optional column access tolerant of schema drift
//! - [`DatasetKind`] - The three datasets of an ARCAD extract
//! - [`columns`] - Column names of the ARCAD listing and XREF exports

pub mod table;

pub use table::{CellValue, Column, Field, Table};

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Column Vocabulary
// =============================================================================

/// Column names used by the ARCAD listing and cross-reference exports.
pub mod columns {
    /// Element type discriminator (`M` = member, `O` = object).
    pub const ELEMENT_TYPE: &str = "LST_CELTTY";
    /// IBM i type code (`*PGM`, `*FILE`, `RPGLE`, ...).
    pub const TYPE: &str = "LST_CTYPE";
    /// Object attribute (`PF`, `LF`, `TABLE`, ...).
    pub const ATTRIBUTE: &str = "LST_CATR";
    /// Application code.
    pub const APPLICATION: &str = "LST_CAPP";
    /// ARCAD component type.
    ///
    /// Not verified against an authoritative ARCAD schema.
    pub const ARCAD_TYPE: &str = "LST_CCPLT";
    /// Source file containing the member (`QRPGLESRC`, `QDDSSRC`, ...).
    pub const SOURCE_FILE: &str = "LST_JSRCF";
    /// Last modification date, ARCAD encoded.
    pub const DATE: &str = "LST_TDATE";

    /// Type of the referencing object.
    pub const XREF_FROM_TYPE: &str = "OXR_FROM_TYPE";
    /// Type of the referenced object.
    pub const XREF_TO_TYPE: &str = "OXR_TO_TYPE";
    /// Name of the referencing object.
    pub const XREF_FROM_OBJECT: &str = "OXR_FROM_OBJ";
    /// Name of the referenced object.
    pub const XREF_TO_OBJECT: &str = "OXR_TO_OBJ";
}

// =============================================================================
// Datasets
// =============================================================================

/// One of the three datasets of an ARCAD extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatasetKind {
    /// Source members.
    Sources,
    /// Compiled objects.
    Objects,
    /// Object cross-references.
    CrossReferences,
}

impl DatasetKind {
    /// All datasets, in loading order.
    pub const ALL: [DatasetKind; 3] = [Self::Sources, Self::Objects, Self::CrossReferences];

    /// File stem of the dataset in the ARCAD archive and in the output directory.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::Sources => "IBMi_RefArcaddesSources",
            Self::Objects => "IBMi_RefArcaddesObjets",
            Self::CrossReferences => "IBMi_RefArcaddesXREF",
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sources => "sources",
            Self::Objects => "objects",
            Self::CrossReferences => "cross-references",
        }
    }

    /// Whether the pipeline can run without this dataset.
    pub fn is_optional(&self) -> bool {
        !matches!(self, Self::Objects)
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
