//! # Dosimetry Module
//!
//! Stateless implementation of the TG-43 line-source formalism. The functions in
//! [`functions`] evaluate the geometry, radial dose and anisotropy factors from
//! tabulated seed data; [`kernel`] tabulates the accumulated dose of one source
//! instance over the integer voxel offsets of a patient mesh so that planners can
//! superpose seeds by lookup.

pub mod functions;
pub mod kernel;
