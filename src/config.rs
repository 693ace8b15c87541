use std::{env, path::PathBuf};

use crate::error::ImportError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5299";
pub const DEFAULT_INPUT_FILE: &str = "./goodreads_library_export.csv";
pub const DEFAULT_OUTPUT_FILE: &str = "./output.csv";
pub const DEFAULT_TARGET_SHELF: &str = "to-read";

/// The value the sample `.env` ships with; never a real key.
const PLACEHOLDER_API_KEY: &str = "YOUR";

/// Runtime configuration, resolved from the process environment.
///
/// `API_KEY` is the only required variable. A `.env` file in the working
/// directory is honored when the binary loads it before calling
/// [`Config::from_env`].
#[derive(Debug, Clone)]
pub struct Config {
    /// LazyLibrarian base URL (`BASE_URL`), without the `/api` suffix.
    pub base_url: String,
    /// API key sent with every command (`API_KEY`).
    pub api_key: String,
    /// Reading-list export to import (`INPUT_FILE`).
    pub input_file: PathBuf,
    /// Annotated result file (`OUTPUT_FILE`).
    pub output_file: PathBuf,
    /// Shelf tag that marks a row as a candidate (`TARGET_SHELF`).
    pub target_shelf: String,
    /// Index of the first data row the engine examines (`START_INDEX`).
    ///
    /// The importer has always started at 1, leaving the first data row
    /// untouched, and the default preserves that. Set `START_INDEX=0` to
    /// process every row.
    pub start_index: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ImportError> {
        Ok(Self {
            base_url: env::var("BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: require_api_key(env::var("API_KEY").ok())?,
            input_file: env::var("INPUT_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_INPUT_FILE)),
            output_file: env::var("OUTPUT_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_FILE)),
            target_shelf: env::var("TARGET_SHELF")
                .unwrap_or_else(|_| DEFAULT_TARGET_SHELF.to_string()),
            start_index: parse_start_index(env::var("START_INDEX").ok())?,
        })
    }
}

fn require_api_key(value: Option<String>) -> Result<String, ImportError> {
    match value {
        Some(key) if !key.is_empty() && key != PLACEHOLDER_API_KEY => Ok(key),
        _ => Err(ImportError::Configuration(
            "API_KEY not found in environment variables".to_string(),
        )),
    }
}

fn parse_start_index(value: Option<String>) -> Result<usize, ImportError> {
    match value {
        None => Ok(1),
        Some(raw) => raw.trim().parse().map_err(|_| {
            ImportError::Configuration(format!(
                "START_INDEX must be a non-negative integer, got `{raw}`"
            ))
        }),
    }
}
