//! Runtime configuration.
//!
//! Resolved from environment variables (a `.env` file is loaded first when
//! present) on top of defaults. CLI flags override the result.
//!
//! | Variable              | Default                           |
//! |-----------------------|-----------------------------------|
//! | `ARCAD_BASE_URL`      | [`DEFAULT_BASE_URL`]              |
//! | `ARCAD_INPUT_DIR`     | unset (remote mode)               |
//! | `ARCAD_INPUT_FORMAT`  | `xlsx`                            |
//! | `ARCAD_OUTPUT_DIR`    | [`DEFAULT_OUTPUT_DIR`]            |
//! | `ARCAD_FETCH_RETRIES` | [`DEFAULT_FETCH_RETRIES`]         |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ConfigError, ConfigResult};
use crate::models::DatasetKind;

/// Archive holding the reference ARCAD extract.
pub const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/LCOUTELLEC/IBMiNeo4jData/main/NEO4J_ARCAD/";

/// Where output tables go by default.
pub const DEFAULT_OUTPUT_DIR: &str = "csv_neo4j";

/// Attempts per remote file.
pub const DEFAULT_FETCH_RETRIES: u32 = 3;

/// Where the raw datasets come from.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    /// `<base_url>/<file>` over HTTP.
    Remote { base_url: String },
    /// `<dir>/<file>` on disk.
    Local { dir: PathBuf },
}

/// File format of the three input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    #[default]
    Xlsx,
    Csv,
}

impl InputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    /// Input file name of a dataset.
    pub fn file_name(&self, kind: DatasetKind) -> String {
        format!("{}.{}", kind.file_stem(), self.extension())
    }
}

impl FromStr for InputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            other => Err(ConfigError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub source: InputSource,
    pub format: InputFormat,
    pub output_dir: PathBuf,
    pub fetch_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: InputSource::Remote {
                base_url: DEFAULT_BASE_URL.to_string(),
            },
            format: InputFormat::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            fetch_retries: DEFAULT_FETCH_RETRIES,
        }
    }
}

impl Config {
    /// Configuration from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        // Try loading .env file
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get("ARCAD_INPUT_DIR") {
            config.source = InputSource::Local { dir: PathBuf::from(dir) };
        } else if let Some(base_url) = get("ARCAD_BASE_URL") {
            config.source = InputSource::Remote { base_url };
        }

        if let Some(format) = get("ARCAD_INPUT_FORMAT") {
            config.format = format.parse()?;
        }

        if let Some(dir) = get("ARCAD_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }

        if let Some(retries) = get("ARCAD_FETCH_RETRIES") {
            config.fetch_retries = retries
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: "ARCAD_FETCH_RETRIES".to_string(),
                    value: retries,
                })?;
        }

        Ok(config)
    }
}
