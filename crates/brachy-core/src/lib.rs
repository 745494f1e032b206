//! # Brachyplan Core Library
//!
//! Dose calculation and seed-placement optimization for permanent-seed prostate
//! brachytherapy, built on the TG-43 dose formalism.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless physics (`dosimetry`), numeric primitives
//!   (`numerics`), seed models and the `SeedCatalog`, the `Patient` dose-mesh state and
//!   I/O for patient data stores and planning reports.
//!
//! - **[`engine`]: The Logic Core.** Planning configuration, errors and progress
//!   reporting, adjoint data generation, candidate enumeration, transactional trials
//!   and the three placement strategies (IIEM, DWDMM, SCM).
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together into a
//!   complete planning run, from loading a patient to returning an optimized plan.

pub mod core;
pub mod engine;
pub mod workflows;
