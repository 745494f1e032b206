//! Synthetic anatomies shared by unit tests across the crate.

use super::mesh::MeshGeometry;
use super::patient::Patient;
use super::position::PreparedSource;
use super::tissue::TissueMasks;
use crate::core::seeds::builtin::BUILTIN_SEEDS;
use crate::core::seeds::source::SourceInstance;
use std::sync::Arc;

pub(crate) const RADIUS_FLOOR: f64 = 0.04;

pub(crate) fn amersham_source(strength: f64) -> SourceInstance {
    let model = BUILTIN_SEEDS
        .get("Amersham6711Seed")
        .unwrap()
        .to_model("Amersham6711Seed");
    SourceInstance::new(Arc::new(model), strength).unwrap()
}

pub(crate) fn prepared_source(mesh: &MeshGeometry, strength: f64) -> Arc<PreparedSource> {
    Arc::new(PreparedSource::new(
        amersham_source(strength),
        mesh,
        RADIUS_FLOOR,
    ))
}

/// 5×5×4 mesh of 0.5 cm voxels:
/// - prostate: `i, j ∈ 1..=3`, `k ∈ 0..=2`, minus the urethra column;
/// - urethra: column `(2, 2)`, every slice;
/// - rectum: row `j = 4`, `i ∈ 1..=3`, every slice;
/// - margin: the remaining border voxels of slices `0..=2`;
/// - needle template: the eight prostate columns.
pub(crate) fn block_anatomy() -> (MeshGeometry, TissueMasks, Vec<bool>) {
    let mesh = MeshGeometry::new([5, 5, 4], [0.5, 0.5, 0.5]).unwrap();
    let n = mesh.voxel_count();
    let mut masks = TissueMasks {
        prostate: vec![false; n],
        urethra: vec![false; n],
        margin: vec![false; n],
        rectum: vec![false; n],
    };
    let mut template = vec![false; mesh.column_count()];

    for k in 0..4 {
        for j in 0..5 {
            for i in 0..5 {
                let index = mesh.flat_index(i, j, k);
                let interior = (1..=3).contains(&i) && (1..=3).contains(&j);
                if i == 2 && j == 2 {
                    masks.urethra[index] = true;
                } else if j == 4 && (1..=3).contains(&i) {
                    masks.rectum[index] = true;
                } else if interior && k <= 2 {
                    masks.prostate[index] = true;
                } else if k <= 2 {
                    masks.margin[index] = true;
                }
                if interior && !(i == 2 && j == 2) {
                    template[mesh.column_index(i, j)] = true;
                }
            }
        }
    }
    (mesh, masks, template)
}

pub(crate) fn block_patient(prescribed_dose: f64) -> Patient {
    let (mesh, masks, template) = block_anatomy();
    Patient::new(mesh, masks, template, prescribed_dose).unwrap()
}

/// 2×3×4 mesh with a single prostate voxel at `(1, 1, 2)` and one needle column
/// above it.
pub(crate) fn single_target_patient(prescribed_dose: f64) -> Patient {
    let mesh = MeshGeometry::new([2, 3, 4], [0.1, 0.1, 0.5]).unwrap();
    let n = mesh.voxel_count();
    let mut masks = TissueMasks {
        prostate: vec![false; n],
        urethra: vec![false; n],
        margin: vec![false; n],
        rectum: vec![false; n],
    };
    masks.prostate[mesh.flat_index(1, 1, 2)] = true;
    let mut template = vec![false; mesh.column_count()];
    template[mesh.column_index(1, 1)] = true;
    Patient::new(mesh, masks, template, prescribed_dose).unwrap()
}
