/*!
 * Configuration types for dossplit
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SplitError};

/// Main configuration for a split run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Input DOSCAR path
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Directory receiving the output files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Output file name prefix; files are named `{prefix}{index}`
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Whether the first block carries its own header line
    #[serde(default)]
    pub first_block_header: FirstBlockHeader,

    /// What to do with a block cut short by end of input
    #[serde(default)]
    pub trailing_block: TrailingBlockPolicy,

    /// Scan and count blocks without writing files
    #[serde(default)]
    pub dry_run: bool,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output_dir: default_output_dir(),
            prefix: default_prefix(),
            first_block_header: FirstBlockHeader::default(),
            trailing_block: TrailingBlockPolicy::default(),
            dry_run: false,
            log_level: LogLevel::default(),
            log_file: None,
            verbose: false,
        }
    }
}

/// Layout of the first block relative to the global header on line 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FirstBlockHeader {
    /// Line 5 is followed by a header line of its own before the first data line
    #[default]
    Separate,

    /// Line 5 doubles as the first block's header (VASP total-DOS layout)
    Shared,
}

/// Policy for a final block with fewer than `rows` data lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrailingBlockPolicy {
    /// Remove the partial file and fail
    #[default]
    Error,

    /// Keep the truncated file and count it
    Keep,

    /// Remove the partial file and carry on
    Discard,
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    #[default]
    Warn,

    /// Info, warnings, and errors
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

// Default value functions for serde
fn default_input() -> PathBuf {
    PathBuf::from("DOSCAR")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_prefix() -> String {
    "DOS".to_string()
}

impl SplitConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SplitError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: SplitConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Path of the output file for block `index`
    pub fn block_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("{}{}", self.prefix, index))
    }
}
