//! # Workflows Module
//!
//! High-level entry points that run a complete planning process.
//!
//! ## Overview
//!
//! A workflow loads the patient from a [`PatientDataStore`](crate::core::io::store::PatientDataStore),
//! resolves the requested seed types against a [`SeedCatalog`](crate::core::seeds::catalog::SeedCatalog),
//! prepares or reuses adjoint data, enumerates candidates and runs the configured
//! placement strategy. Callers receive the final patient state together with a
//! summary of the run.
//!
//! ## Architecture
//!
//! - **Planning Workflow** ([`plan`]) - Patient loading, adjoint caching, candidate
//!   ranking and optimization with IIEM, DWDMM or SCM.

pub mod plan;
