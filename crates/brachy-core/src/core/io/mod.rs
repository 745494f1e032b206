//! Input/output for patient data, adjoint caches and planning reports.
//!
//! Patient anatomy and cached adjoint arrays are reached through the
//! [`store::PatientDataStore`] trait, a key-to-array interface with a TOML-backed
//! implementation in [`toml_file`] and an in-memory one for tests and embedding.
//! Plan tables and dose-volume histograms are written by [`report`].

pub mod report;
pub mod store;
pub mod toml_file;

use crate::core::models::PatientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },

    #[error("TOML serialization error for '{path}': {source}")]
    Serialize {
        path: String,
        source: toml::ser::Error,
    },

    #[error("Missing required entry '{0}'")]
    MissingKey(String),

    #[error("Key '{0}' is not supported by this store")]
    UnsupportedKey(String),

    #[error("Array '{key}' has {actual} entries, expected {expected}")]
    ShapeMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid value in '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error(transparent)]
    Patient(#[from] PatientError),
}
