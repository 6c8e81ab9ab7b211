//! Dataset acquisition.
//!
//! Fetches the three ARCAD files from the remote archive or reads them
//! from a local directory, then decodes them with [`crate::parser`].
//! A dataset that cannot be obtained is reported and becomes absent;
//! whether that is fatal is decided by the pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{Config, InputFormat, InputSource};
use crate::error::{LoadError, LoadResult};
use crate::logs::{log_error, log_info, log_success_indent, log_warning};
use crate::models::{DatasetKind, Table};
use crate::parser::{parse_bytes_auto, ParsedDataset};
use crate::transform::pipeline::RawDatasets;

/// Delay between retries in milliseconds
const RETRY_DELAY_MS: u64 = 1000;

/// Loads ARCAD datasets from one source.
#[derive(Clone)]
pub struct DatasetLoader {
    source: InputSource,
    format: InputFormat,
    retries: u32,
    client: reqwest::Client,
}

impl DatasetLoader {
    pub fn new(config: &Config) -> Self {
        Self {
            source: config.source.clone(),
            format: config.format,
            retries: config.fetch_retries.max(1),
            client: reqwest::Client::new(),
        }
    }

    /// URL or path of a dataset, for display.
    pub fn location(&self, kind: DatasetKind) -> String {
        let file = self.format.file_name(kind);
        match &self.source {
            InputSource::Remote { base_url } => remote_url(base_url, &file),
            InputSource::Local { dir } => dir.join(file).display().to_string(),
        }
    }

    /// Raw bytes of a dataset.
    pub async fn fetch_bytes(&self, kind: DatasetKind) -> LoadResult<Vec<u8>> {
        match &self.source {
            InputSource::Remote { base_url } => {
                let url = remote_url(base_url, &self.format.file_name(kind));
                self.download_with_retries(&url).await
            }
            InputSource::Local { dir } => read_file(&dir.join(self.format.file_name(kind))).await,
        }
    }

    /// Fetch and decode a dataset.
    pub async fn load(&self, kind: DatasetKind) -> LoadResult<ParsedDataset> {
        log_info(format!("Loading {} from {}", kind, self.location(kind)));
        let bytes = self.fetch_bytes(kind).await?;
        let parsed = parse_bytes_auto(&bytes)?;
        log_success_indent(
            format!(
                "{}: {} rows, {} columns, {} bytes, {}",
                kind,
                parsed.table.len(),
                parsed.table.columns().len(),
                bytes.len(),
                parsed.format
            ),
            1,
        );
        Ok(parsed)
    }

    /// Load the three datasets concurrently; failures become absent datasets.
    pub async fn load_all(&self) -> RawDatasets {
        let (sources, objects, cross_references) = tokio::join!(
            self.load(DatasetKind::Sources),
            self.load(DatasetKind::Objects),
            self.load(DatasetKind::CrossReferences),
        );

        RawDatasets {
            sources: keep_or_report(DatasetKind::Sources, sources),
            objects: keep_or_report(DatasetKind::Objects, objects),
            cross_references: keep_or_report(DatasetKind::CrossReferences, cross_references),
        }
    }

    async fn download_with_retries(&self, url: &str) -> LoadResult<Vec<u8>> {
        let mut last_error = None;

        for attempt in 1..=self.retries {
            match self.download(url).await {
                Ok(bytes) => return Ok(bytes),
                // Not worth retrying a missing file
                Err(e @ LoadError::HttpStatus { status: 404, .. }) => return Err(e),
                Err(e) => {
                    log_warning(format!("Attempt {}/{} failed: {}", attempt, self.retries, e));
                    last_error = Some(e);

                    if attempt < self.retries {
                        tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| LoadError::Request {
            url: url.to_string(),
            message: "no attempt made".to_string(),
        }))
    }

    async fn download(&self, url: &str) -> LoadResult<Vec<u8>> {
        let response = self.client.get(url).send().await.map_err(|e| LoadError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| LoadError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

fn remote_url(base_url: &str, file: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), file)
}

fn keep_or_report(kind: DatasetKind, result: LoadResult<ParsedDataset>) -> Option<Table> {
    match result {
        Ok(parsed) => Some(parsed.table),
        Err(e) if kind.is_optional() => {
            log_warning(format!("{} not available, continuing without it: {}", kind, e));
            None
        }
        Err(e) => {
            log_error(format!("{} not available: {}", kind, e));
            None
        }
    }
}

async fn read_file(path: &Path) -> LoadResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode a single local file (any supported format).
pub async fn load_file(path: impl Into<PathBuf>) -> LoadResult<ParsedDataset> {
    let path = path.into();
    let bytes = read_file(&path).await?;
    Ok(parse_bytes_auto(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn local_config(dir: &Path) -> Config {
        Config {
            source: InputSource::Local { dir: dir.to_path_buf() },
            format: InputFormat::Csv,
            ..Config::default()
        }
    }

    #[test]
    fn test_remote_url_joins_once() {
        assert_eq!(
            remote_url("https://host/base/", "IBMi_RefArcaddesXREF.xlsx"),
            "https://host/base/IBMi_RefArcaddesXREF.xlsx"
        );
        assert_eq!(remote_url("https://host/base", "a.csv"), "https://host/base/a.csv");
    }

    #[tokio::test]
    async fn test_load_all_from_local_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("IBMi_RefArcaddesObjets.csv"),
            "LST_CELTTY;LST_CTYPE;LST_CAPP\nO;*PGM;APP1\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("IBMi_RefArcaddesSources.csv"),
            "LST_CELTTY,LST_CTYPE\nM,RPGLE\n",
        )
        .unwrap();

        crate::logs::set_echo(false);
        let loader = DatasetLoader::new(&local_config(dir.path()));
        let raw = loader.load_all().await;

        assert_eq!(raw.objects.map(|t| t.len()), Some(1));
        assert_eq!(raw.sources.map(|t| t.len()), Some(1));
        assert!(raw.cross_references.is_none());
    }

    #[tokio::test]
    async fn test_missing_local_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = DatasetLoader::new(&local_config(dir.path()));
        let result = loader.fetch_bytes(DatasetKind::Objects).await;
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[tokio::test]
    async fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xref.csv");
        fs::write(&path, "OXR_FROM_TYPE|OXR_TO_TYPE\n*PGM|*FILE\n").unwrap();

        let parsed = load_file(&path).await.unwrap();
        assert_eq!(parsed.table.columns(), ["OXR_FROM_TYPE", "OXR_TO_TYPE"]);
    }
}
