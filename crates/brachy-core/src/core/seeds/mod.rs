//! # Seeds Module
//!
//! Seed models are plain parameter bundles. A [`catalog::SeedCatalog`] maps a seed
//! identifier to its [`model::SeedModel`] and acts as the factory for
//! [`source::SourceInstance`] values, which bind a model to a calibrated strength.
//!
//! - [`model`] - Seed parameter types and validation
//! - [`builtin`] - Compiled-in parameter sets for commercially available seeds
//! - [`catalog`] - Identifier lookup, TOML loading and instance creation
//! - [`source`] - Dose-rate and total-dose evaluation for one source

pub mod builtin;
pub mod catalog;
pub mod model;
pub mod source;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum SeedError {
    #[error("Unknown seed type: '{0}'")]
    UnknownSeedType(String),

    #[error("Invalid air-kerma strength {strength} for seed '{seed}': must be positive and finite")]
    InvalidStrength { seed: String, strength: f64 },

    #[error("Malformed parameter table for seed '{seed}': {reason}")]
    MalformedTable { seed: String, reason: String },
}
