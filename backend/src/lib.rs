//! # Arcadgraph - ARCAD IBM i inventory to graph import tables
//!
//! Arcadgraph reads the three datasets of an ARCAD extract (source members,
//! objects, cross-references), keeps the records relevant to a program/table
//! dependency graph, derives the controlled vocabularies, and writes
//! CSV tables ready for a Neo4j import together with a statistics report.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ ARCAD files │────▶│   Parser    │────▶│  Transform  │────▶│  CSV + text │
//! │ (xlsx/csv)  │     │ (auto-fmt)  │     │ (classify)  │     │  (report)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use arcadgraph::{convert, write_outputs, Config, PipelineOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().unwrap();
//!     let output = convert(&config, &PipelineOptions::now()).await.unwrap();
//!     write_outputs(&output, &config.output_dir).unwrap();
//!     println!("{} programs, {} tables", output.programs.len(), output.tables.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Tabular model and ARCAD column names
//! - [`config`] - Environment configuration
//! - [`parser`] - Workbook and CSV decoding with auto-detection
//! - [`loader`] - Remote and local dataset acquisition
//! - [`transform`] - Normalization, classification, extraction, pipeline
//! - [`report`] - Statistics report
//! - [`writer`] - Output persistence
//! - [`logs`] - Progress lines

// Core modules
pub mod error;
pub mod models;
pub mod logs;
pub mod config;

// Input
pub mod parser;
pub mod loader;

// Transformation
pub mod transform;
pub mod report;

// Output
pub mod writer;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, LoadError, ParseError, PipelineError, WriteError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{CellValue, Column, DatasetKind, Field, Table};

// =============================================================================
// Re-exports - Configuration & Loading
// =============================================================================

pub use config::{Config, InputFormat, InputSource};
pub use loader::{load_file, DatasetLoader};
pub use parser::{parse_bytes_auto, ParsedDataset, PayloadFormat};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::{
    convert,
    log_summary,
    run,
    DegradedEffect,
    Observation,
    PipelineOptions,
    PipelineOutput,
    RawDatasets,
    Vocabulary,
    VocabularyKind,
};

// =============================================================================
// Re-exports - Report & Output
// =============================================================================

pub use report::{build_report, InventoryReport, ReportInput, SectionKind};
pub use writer::{write_outputs, WrittenFile};
