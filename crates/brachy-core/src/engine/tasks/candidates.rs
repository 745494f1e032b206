use super::adjoint::AdjointData;
use crate::core::models::patient::Patient;
use crate::core::models::position::{PreparedSource, SeedPosition};
use crate::engine::config::OrganWeights;
use std::sync::Arc;
use tracing::{debug, warn};

/// Static ranking weight of a seed at voxel `index`: the importance-weighted
/// off-target response divided by the prostate response.
///
/// Returns `None` when the weight is unusable (non-positive prostate response,
/// negative or non-finite ratio). A zero ratio is raised to the smallest positive
/// `f64` so every candidate keeps a strictly positive weight.
pub fn candidate_weight(adjoint: &AdjointData, weights: &OrganWeights, index: usize) -> Option<f64> {
    let benefit = adjoint.prostate[index];
    if !(benefit > 0.0) {
        return None;
    }
    let cost = weights.urethra * adjoint.urethra[index]
        + weights.margin * adjoint.margin[index]
        + weights.rectum * adjoint.rectum[index];
    let weight = cost / benefit;
    if !weight.is_finite() || weight < 0.0 {
        None
    } else if weight == 0.0 {
        Some(f64::MIN_POSITIVE)
    } else {
        Some(weight)
    }
}

/// Enumerates candidate seed positions for every source, in source order.
///
/// Within one source, candidates follow needle-template columns row by row
/// (x fastest) and then depth, restricted to prostate voxels.
pub fn enumerate(
    patient: &Patient,
    sources: &[(Arc<PreparedSource>, AdjointData)],
    weights: &OrganWeights,
) -> Vec<SeedPosition> {
    let mesh = patient.mesh();
    let prostate = &patient.masks().prostate;
    let mut candidates = Vec::new();

    for (source, adjoint) in sources {
        let before = candidates.len();
        for j in 0..mesh.ny() {
            for i in 0..mesh.nx() {
                if !patient.is_needle_column(i, j) {
                    continue;
                }
                for k in 0..mesh.nz() {
                    let index = mesh.flat_index(i, j, k);
                    if !prostate[index] {
                        continue;
                    }
                    match candidate_weight(adjoint, weights, index) {
                        Some(weight) => candidates.push(SeedPosition::new(
                            [i, j, k],
                            weight,
                            Arc::clone(source),
                        )),
                        None => warn!(
                            seed = source.name(),
                            x = i,
                            y = j,
                            z = k,
                            "Skipping candidate with unusable ranking weight."
                        ),
                    }
                }
            }
        }
        debug!(
            seed = source.name(),
            candidates = candidates.len() - before,
            "Enumerated candidate seed positions."
        );
    }
    candidates
}
