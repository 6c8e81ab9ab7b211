//! High-level pipeline API for ARCAD extract conversion.
//!
//! [`run`] is the pure core: raw tables in, output tables and report out,
//! no I/O and no logging. [`convert`] wraps it with loading and progress
//! lines for the CLI.
//!
//! # Example
//!
//! ```rust,ignore
//! use arcadgraph::{convert, Config, PipelineOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let output = convert(&config, &PipelineOptions::now()).await?;
//!     println!("{} programs", output.programs.len());
//!     Ok(())
//! }
//! ```

use chrono::{Local, NaiveDateTime};

use super::classify::{classify_objects, classify_sources, Classified};
use super::extract::{extract_entities, Entities, Vocabulary};
use super::normalize::normalize_dataset;
use super::observation::Observation;
use super::relations::{filter_relations, relation_counts};
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::loader::DatasetLoader;
use crate::logs::{log_info, log_info_indent, log_success, log_success_indent, log_warning};
use crate::models::{DatasetKind, Table};
use crate::report::{build_report, InventoryReport, ReportInput};

/// The three raw datasets; `None` when a dataset could not be obtained.
#[derive(Debug, Clone, Default)]
pub struct RawDatasets {
    pub sources: Option<Table>,
    pub objects: Option<Table>,
    pub cross_references: Option<Table>,
}

/// Options for a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Timestamp printed in the report header
    pub generated_at: NaiveDateTime,
}

impl PipelineOptions {
    /// Options stamped with the local clock.
    pub fn now() -> Self {
        Self {
            generated_at: Local::now().naive_local(),
        }
    }
}

/// Rows read per dataset, before filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawCounts {
    pub sources: Option<usize>,
    pub objects: usize,
    pub cross_references: Option<usize>,
}

/// Result of a complete pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Filtered source members (absent if the dataset was)
    pub sources: Option<Table>,
    /// Filtered objects
    pub objects: Table,
    pub programs: Table,
    pub tables: Table,
    /// Supported cross-references (absent if the dataset was)
    pub cross_references: Option<Table>,
    pub applications: Vocabulary,
    pub ibmi_types: Vocabulary,
    pub arcad_types: Vocabulary,
    pub attributes: Vocabulary,
    pub report: InventoryReport,
    /// Schema drift met along the way
    pub observations: Vec<Observation>,
    pub raw_counts: RawCounts,
}

impl PipelineOutput {
    /// The four vocabularies in output order.
    pub fn vocabularies(&self) -> [&Vocabulary; 4] {
        [&self.applications, &self.ibmi_types, &self.arcad_types, &self.attributes]
    }
}

/// Run the transformation on raw datasets.
///
/// Fails only when the objects are missing: programs, tables and
/// vocabularies cannot be derived without them. Absent sources or
/// cross-references are carried through as absent.
pub fn run(raw: RawDatasets, options: &PipelineOptions) -> PipelineResult<PipelineOutput> {
    let objects = raw
        .objects
        .ok_or(PipelineError::MissingDataset(DatasetKind::Objects))?;

    let mut observations = Vec::new();
    let mut take = |classified: Classified| {
        observations.extend(classified.observations);
        classified.table
    };

    let raw_counts = RawCounts {
        sources: raw.sources.as_ref().map(Table::len),
        objects: objects.len(),
        cross_references: raw.cross_references.as_ref().map(Table::len),
    };

    let sources = raw
        .sources
        .map(|t| take(classify_sources(&normalize_dataset(t, DatasetKind::Sources))));
    let objects = take(classify_objects(&normalize_dataset(objects, DatasetKind::Objects)));
    let cross_references = raw.cross_references.map(|t| {
        take(filter_relations(&normalize_dataset(t, DatasetKind::CrossReferences)))
    });

    let Entities {
        programs,
        tables,
        applications,
        ibmi_types,
        arcad_types,
        attributes,
        observations: entity_observations,
    } = extract_entities(&objects);
    observations.extend(entity_observations);

    let report = build_report(
        &ReportInput {
            sources: sources.as_ref(),
            objects: Some(&objects),
            cross_references: cross_references.as_ref(),
        },
        options.generated_at,
    );

    Ok(PipelineOutput {
        sources,
        objects,
        programs,
        tables,
        cross_references,
        applications,
        ibmi_types,
        arcad_types,
        attributes,
        report,
        observations,
        raw_counts,
    })
}

/// Load the datasets described by `config` and run the pipeline.
pub async fn convert(config: &Config, options: &PipelineOptions) -> PipelineResult<PipelineOutput> {
    log_info("📖 Loading ARCAD datasets...");
    let loader = DatasetLoader::new(config);
    let raw = loader.load_all().await;

    log_info("⚙️  Classifying records...");
    let output = run(raw, options)?;
    log_summary(&output);
    Ok(output)
}

/// Emit progress lines describing a finished run.
pub fn log_summary(output: &PipelineOutput) {
    let counts = &output.raw_counts;

    if let (Some(read), Some(kept)) = (counts.sources, &output.sources) {
        log_success(format!("Sources: {} read, {} kept", read, kept.len()));
    }
    log_success(format!("Objects: {} read, {} kept", counts.objects, output.objects.len()));
    log_success_indent(format!("Programs: {}", output.programs.len()), 1);
    log_success_indent(format!("Tables: {}", output.tables.len()), 1);
    if let (Some(read), Some(kept)) = (counts.cross_references, &output.cross_references) {
        let (calls, uses) = relation_counts(kept);
        log_success(format!("Cross-references: {} read, {} kept", read, kept.len()));
        log_info_indent(format!("{} program calls, {} file usages", calls, uses), 1);
    }

    for vocabulary in output.vocabularies() {
        log_info_indent(
            format!("{}: {} values", vocabulary.kind.file_name(), vocabulary.len()),
            1,
        );
    }

    for observation in &output.observations {
        log_warning(observation.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;
    use crate::report::SectionKind;
    use crate::transform::observation::DegradedEffect;
    use chrono::NaiveDate;

    fn options() -> PipelineOptions {
        PipelineOptions {
            generated_at: NaiveDate::from_ymd_opt(2025, 1, 15)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        }
    }

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::from_rows(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| CellValue::from(*v)).collect())
                .collect(),
        )
    }

    fn two_objects() -> Table {
        table(
            &["LST_CELTTY", "LST_CTYPE", "LST_CATR", "LST_CAPP"],
            &[&["O", "*PGM", "", "APP1"], &["O", "*FILE", "PF", "APP1"]],
        )
    }

    #[test]
    fn test_end_to_end_objects_only() {
        let raw = RawDatasets {
            objects: Some(two_objects()),
            ..Default::default()
        };
        let out = run(raw, &options()).unwrap();

        assert_eq!(out.objects.len(), 2);
        assert_eq!(out.programs.len(), 1);
        assert_eq!(out.tables.len(), 1);
        assert_eq!(out.applications.values().collect::<Vec<_>>(), ["APP1"]);
        assert!(out.sources.is_none());
        assert!(out.cross_references.is_none());

        let totals = out.report.section(SectionKind::Totals).unwrap();
        assert_eq!(totals.count("Objects"), Some(2));
        assert!(out.report.render().contains("Objects: 2"));
    }

    #[test]
    fn test_missing_objects_is_fatal() {
        let raw = RawDatasets {
            sources: Some(table(&["LST_CELTTY"], &[&["M"]])),
            objects: None,
            cross_references: None,
        };
        let err = run(raw, &options()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingDataset(DatasetKind::Objects)));
    }

    #[test]
    fn test_dropping_attribute_column_degrades() {
        let objects = table(
            &["LST_CELTTY", "LST_CTYPE", "LST_CAPP"],
            &[&["O", "*PGM", "APP1"], &["O", "*FILE", "APP1"]],
        );
        let out = run(
            RawDatasets { objects: Some(objects), ..Default::default() },
            &options(),
        )
        .unwrap();

        assert!(out.tables.is_empty());
        assert_eq!(out.programs.len(), 1);
        assert!(out.attributes.is_empty());
        assert!(out.observations.iter().any(|o| o.column == "LST_CATR"
            && o.effect == DegradedEffect::SubsetEmpty { subset: "tables" }));
        assert!(out.report.section(SectionKind::Attributes).is_none());
    }

    #[test]
    fn test_full_run() {
        let sources = table(
            &["LST_CELTTY", "LST_CTYPE", "LST_JSRCF", "LST_TDATE"],
            &[
                &["M", "RPGLE", "QRPGLESRC", "20230115"],
                &["M", "TXT", "QTXTSRC", "230115"],
                &["O", "*PGM", "", "0"],
                &[" M ", " CLLE ", "QCLSRC", ""],
            ],
        );
        let objects = table(
            &["LST_CELTTY", "LST_CTYPE", "LST_CATR", "LST_CAPP", "LST_CCPLT"],
            &[
                &["O", "*PGM", "RPGLE", "APP1", "PGM"],
                &["M", "RPGLE", "", "APP1", ""],
                &["O", "*FILE", "LF", "APP2", "LF"],
            ],
        );
        let xref = table(
            &["OXR_FROM_TYPE", "OXR_FROM_OBJ", "OXR_TO_TYPE", "OXR_TO_OBJ"],
            &[
                &["*PGM", "A", "*PGM", "B"],
                &["*PGM", "A", "*DTAARA", "D"],
                &["*PGM", "B", "*FILE", "CUST"],
            ],
        );

        let out = run(
            RawDatasets {
                sources: Some(sources),
                objects: Some(objects),
                cross_references: Some(xref),
            },
            &options(),
        )
        .unwrap();

        let sources = out.sources.as_ref().unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources.rows()[0][3], CellValue::text("2023-01-15"));
        assert_eq!(sources.rows()[1][1], CellValue::text("CLLE"));

        assert_eq!(out.objects.len(), 2);
        assert!(out.tables.is_empty());
        assert_eq!(out.cross_references.as_ref().map(Table::len), Some(2));
        assert_eq!(
            out.raw_counts,
            RawCounts { sources: Some(4), objects: 3, cross_references: Some(3) }
        );
        assert!(out.observations.is_empty());

        let shapes = out.report.section(SectionKind::CrossReferenceShapes).unwrap();
        assert_eq!(shapes.count("*PGM -> *PGM"), Some(1));
        assert_eq!(shapes.count("*PGM -> *FILE"), Some(1));
        assert_eq!(
            out.report.section(SectionKind::SourceTypes).unwrap().count("RPGLE"),
            Some(1)
        );
    }

    #[test]
    fn test_summary_logs_observations_as_warnings() {
        use crate::logs::{self, LogLevel};
        use tokio::sync::broadcast::error::TryRecvError;

        let objects = table(&["LST_CELTTY", "LST_CTYPE"], &[&["O", "*PGM"]]);
        let out = run(
            RawDatasets { objects: Some(objects), ..Default::default() },
            &options(),
        )
        .unwrap();
        assert!(!out.observations.is_empty());

        logs::set_echo(false);
        let mut rx = logs::subscribe();
        log_summary(&out);

        // Other tests share the global channel
        let mut warnings = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(entry) if entry.level == LogLevel::Warning => warnings.push(entry.message),
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        for observation in &out.observations {
            assert!(warnings.contains(&observation.to_string()));
        }
    }

    #[test]
    fn test_run_is_deterministic() {
        let raw = RawDatasets {
            objects: Some(two_objects()),
            ..Default::default()
        };
        let a = run(raw.clone(), &options()).unwrap();
        let b = run(raw, &options()).unwrap();
        assert_eq!(a.report, b.report);
        assert_eq!(a.objects, b.objects);
        assert_eq!(a.applications, b.applications);
    }
}
