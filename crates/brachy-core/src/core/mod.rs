//! # Core Module
//!
//! Fundamental building blocks for brachytherapy planning: the TG-43 dose model,
//! seed parameter sets, the voxelized patient and its I/O.
//!
//! ## Architecture
//!
//! - **Numeric Primitives** ([`numerics`]) - Bracketing search and 1D interpolation laws
//! - **Dose Physics** ([`dosimetry`]) - Geometry, radial dose and anisotropy functions and precomputed dose kernels
//! - **Seed Models** ([`seeds`]) - Parameter sets, compiled-in seeds, the catalog and source instances
//! - **Patient State** ([`models`]) - Mesh, tissue masks, seed positions, plans and dose accumulation
//! - **Data Access** ([`io`]) - Patient data stores, adjoint caching and planning reports
//!
//! Everything in this layer is free of optimization policy. The planners in
//! [`crate::engine`] drive the patient state exclusively through its public
//! operations.

pub mod dosimetry;
pub mod io;
pub mod models;
pub mod numerics;
pub mod seeds;
