//! CLI error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration is invalid or missing required fields.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A monetary amount could not be parsed.
    #[error("invalid amount '{0}': expected a non-negative number with at most two decimals")]
    InvalidAmount(String),

    /// The lead file or stdin did not contain JSON.
    #[error("invalid lead JSON in {source_name}: {reason}")]
    InvalidLead { source_name: String, reason: String },

    /// The lead file could not be read.
    #[error("cannot read {path}: {reason}")]
    LeadFile { path: PathBuf, reason: String },

    /// An error occurred in the data layer.
    #[error(transparent)]
    Pipeline(#[from] pipeline::Error),

    /// A tool failed when invoked directly.
    #[error(transparent)]
    Tool(#[from] assistant::ToolError),

    #[error("cannot encode output: {0}")]
    Encode(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
