//! Error types for changeview-core

use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,

    /// Neither the configuration nor the command line names a changelog dataset.
    #[error("no changelog dataset configured: set `changelog_path` or pass --input")]
    MissingChangelogPath,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while building the changelog model from a dataset.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The dataset does not have the ordered single-key-record shape.
    #[error("invalid input shape in {context}: expected {expected}")]
    InvalidInputShape {
        /// Where in the dataset the mismatch was found.
        context: String,
        /// What was expected at that position.
        expected: &'static str,
    },

    /// The dataset is not valid JSON, or a notes payload has the wrong field types.
    #[error("failed to parse changelog dataset: {0}")]
    Parse(#[from] serde_json::Error),

    /// The dataset file could not be read.
    #[error("failed to read changelog dataset at {path}: {source}")]
    Read {
        /// Path to the dataset file.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl ModelError {
    pub(crate) fn shape(context: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidInputShape {
            context: context.into(),
            expected,
        }
    }
}

/// Result type alias using [`ModelError`].
pub type ModelResult<T> = Result<T, ModelError>;

/// Reasons a compare-view selection was rejected.
///
/// A rejected selection never changes the engine state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The index does not address a catalogue entry.
    #[error("index {index} is out of range for a catalogue of {len} versions")]
    OutOfRange {
        /// The rejected index.
        index: usize,
        /// Number of catalogue entries.
        len: usize,
    },

    /// The start boundary must come strictly before the end boundary.
    #[error("start index {start} must be before end index {end}")]
    StartNotBeforeEnd {
        /// The rejected start index.
        start: usize,
        /// The current end index.
        end: usize,
    },

    /// A start boundary was chosen before any end boundary.
    #[error("select an end version before choosing a start version")]
    NoEndSelected,

    /// The version identifier is not in the catalogue.
    #[error("unknown version: {0}")]
    UnknownVersion(String),
}
