use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::DataStoreError;
use crate::core::models::PatientError;
use crate::core::seeds::SeedError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown seed type: '{0}'")]
    UnknownSeedType(String),

    #[error("Patient data access failed: {source}")]
    DataAccess {
        #[from]
        source: DataStoreError,
    },

    #[error("Patient state error: {source}")]
    Patient {
        #[from]
        source: PatientError,
    },

    #[error("Seed error: {0}")]
    Seed(SeedError),

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("No candidate seed positions: {0}")]
    NoCandidates(String),
}

impl From<SeedError> for EngineError {
    fn from(err: SeedError) -> Self {
        match err {
            SeedError::UnknownSeedType(name) => EngineError::UnknownSeedType(name),
            other => EngineError::Seed(other),
        }
    }
}
