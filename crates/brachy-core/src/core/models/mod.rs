//! # Models Module
//!
//! Patient-side data structures: mesh geometry, tissue masks, seed positions and the
//! mutable [`patient::Patient`] state that accumulates dose as seeds are inserted.
//!
//! - [`mesh`] - Voxel counts, voxel sizes and index arithmetic
//! - [`tissue`] - Organ masks and the tissue priority chain
//! - [`position`] - Seed positions and the prepared sources they reference
//! - [`plan`] - Treatment plans and state snapshots
//! - [`patient`] - Dose accumulation, coverage queries and backtracking

pub mod mesh;
pub mod patient;
pub mod plan;
pub mod position;
pub mod tissue;

#[cfg(test)]
pub(crate) mod fixtures;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum PatientError {
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("Array '{name}' has {actual} entries, expected {expected}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid prescribed dose {0} cGy: must be positive and finite")]
    InvalidPrescribedDose(f64),

    #[error("Seed position {indices:?} lies outside the mesh")]
    OutOfRange { indices: [usize; 3] },

    #[error("Seed position {indices:?} is already occupied")]
    PositionOccupied { indices: [usize; 3] },

    #[error(
        "Dose kernel of '{seed}' was built for a {kernel:?} mesh, patient mesh is {patient:?}"
    )]
    KernelMismatch {
        seed: String,
        kernel: [usize; 3],
        patient: [usize; 3],
    },
}
