//! Output persistence.
//!
//! Writes every output table as UTF-8, comma-delimited CSV with a header
//! row, and the rendered report as plain text. File names are the ones the
//! graph import script expects.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{WriteError, WriteResult};
use crate::logs::{log_info, log_success_indent};
use crate::models::{DatasetKind, Table};
use crate::report::InventoryReport;
use crate::transform::{PipelineOutput, Vocabulary};

/// Programs subset file.
pub const PROGRAMS_FILE: &str = "IBMi_RefArcaddesObjets_Programmes.csv";
/// Tables subset file.
pub const TABLES_FILE: &str = "IBMi_RefArcaddesObjets_Tables.csv";
/// Report file.
pub const REPORT_FILE: &str = "rapport_statistiques.txt";

/// A file produced by [`write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Write all outputs of a run into `dir` (created if needed).
pub fn write_outputs(output: &PipelineOutput, dir: &Path) -> WriteResult<Vec<WrittenFile>> {
    fs::create_dir_all(dir).map_err(|source| WriteError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    log_info(format!("💾 Writing outputs to {}", dir.display()));

    let mut written = Vec::new();

    if let Some(sources) = &output.sources {
        written.push(write_table(sources, &dir.join(dataset_file(DatasetKind::Sources)))?);
    }
    written.push(write_table(&output.objects, &dir.join(dataset_file(DatasetKind::Objects)))?);
    written.push(write_table(&output.programs, &dir.join(PROGRAMS_FILE))?);
    written.push(write_table(&output.tables, &dir.join(TABLES_FILE))?);
    if let Some(xref) = &output.cross_references {
        written.push(write_table(xref, &dir.join(dataset_file(DatasetKind::CrossReferences)))?);
    }

    for vocabulary in output.vocabularies() {
        written.push(write_vocabulary(vocabulary, &dir.join(vocabulary.kind.file_name()))?);
    }

    written.push(write_report(&output.report, &dir.join(REPORT_FILE))?);

    for file in &written {
        log_success_indent(format!("{} ({} bytes)", file.path.display(), file.bytes), 1);
    }
    Ok(written)
}

fn dataset_file(kind: DatasetKind) -> String {
    format!("{}.csv", kind.file_stem())
}

/// Write one table with its header.
pub fn write_table(table: &Table, path: &Path) -> WriteResult<WrittenFile> {
    let mut writer = csv_writer(path)?;
    writer.write_record(table.columns()).map_err(|e| csv_error(path, e))?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.render()))
            .map_err(|e| csv_error(path, e))?;
    }
    finish(writer, path)
}

/// Write a vocabulary as `(<key>, description)`.
pub fn write_vocabulary(vocabulary: &Vocabulary, path: &Path) -> WriteResult<WrittenFile> {
    let mut writer = csv_writer(path)?;
    writer
        .write_record([vocabulary.kind.key_header(), "description"])
        .map_err(|e| csv_error(path, e))?;
    for entry in &vocabulary.entries {
        writer
            .write_record([entry.value.as_str(), entry.description.as_str()])
            .map_err(|e| csv_error(path, e))?;
    }
    finish(writer, path)
}

/// Write the rendered report.
pub fn write_report(report: &InventoryReport, path: &Path) -> WriteResult<WrittenFile> {
    fs::write(path, report.render()).map_err(|source| io_error(path, source))?;
    file_info(path)
}

fn csv_writer(path: &Path) -> WriteResult<csv::Writer<fs::File>> {
    csv::Writer::from_path(path).map_err(|e| csv_error(path, e))
}

fn finish(mut writer: csv::Writer<fs::File>, path: &Path) -> WriteResult<WrittenFile> {
    writer.flush().map_err(|source| io_error(path, source))?;
    file_info(path)
}

fn file_info(path: &Path) -> WriteResult<WrittenFile> {
    let bytes = fs::metadata(path).map_err(|source| io_error(path, source))?.len();
    Ok(WrittenFile {
        path: path.to_path_buf(),
        bytes,
    })
}

fn io_error(path: &Path, source: std::io::Error) -> WriteError {
    WriteError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_error(path: &Path, source: csv::Error) -> WriteError {
    WriteError::Csv {
        path: path.to_path_buf(),
        source,
    }
}
