use super::index_of_min;
use crate::core::models::patient::Patient;
use crate::core::models::position::SeedPosition;
use crate::engine::config::PlannerType;
use crate::engine::context::PlanningContext;
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use crate::engine::state::PlanOutcome;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

const PENALTY_SCALE: f64 = 900.0;

/// Multiplier applied to a candidate that would open a new needle when
/// `needles_used` needles are already in the plan. Infinite once the formula's
/// denominator is no longer positive.
pub fn needle_penalty_factor(needles_used: usize) -> f64 {
    let m2 = ((needles_used + 1) as f64).powi(2);
    let denominator = PENALTY_SCALE - m2;
    if denominator <= 0.0 {
        f64::INFINITY
    } else {
        0.5 * ((PENALTY_SCALE + m2) / denominator).sqrt()
    }
}

/// Static weight scaled by the current relative dose at the candidate's voxel.
#[inline]
pub fn dynamic_weight(candidate: &SeedPosition, patient: &Patient) -> f64 {
    candidate.weight() * patient.dose_at_position(candidate) / patient.prescribed_dose()
}

/// Picks the index to insert after applying the needle-reuse penalty.
///
/// The current best candidate is accepted if it lies on a used needle. Otherwise
/// its weight is multiplied by the penalty and the minimum is re-evaluated; if the
/// same candidate is still the minimum it is accepted. Each candidate is penalized
/// at most once.
fn select_with_needle_penalty(
    patient: &Patient,
    candidates: &[SeedPosition],
    weights: &mut [f64],
) -> Option<usize> {
    let penalty = needle_penalty_factor(patient.num_needles());
    let mut penalized = vec![false; candidates.len()];
    let mut best = index_of_min(weights.iter().copied())?;

    loop {
        if penalized[best] || patient.is_seed_on_needle(&candidates[best]) {
            return Some(best);
        }
        weights[best] *= penalty;
        penalized[best] = true;

        let next = index_of_min(weights.iter().copied())?;
        if next == best {
            return Some(best);
        }
        best = next;
    }
}

/// Dynamic-weight greedy placement.
///
/// After a first seed at the lowest static weight, every round re-weights the
/// remaining candidates by [`dynamic_weight`] and inserts the minimum, optionally
/// subject to the needle-reuse penalty.
#[instrument(skip_all, name = "dwdmm_planner")]
pub fn run(
    patient: &mut Patient,
    candidates: Vec<SeedPosition>,
    context: &PlanningContext,
) -> Result<PlanOutcome, EngineError> {
    let start = Instant::now();
    let goal = context.coverage_goal();
    let use_penalty = context.config.needle_penalty;
    let reporter = context.reporter;
    let mut remaining = candidates;

    info!(
        candidates = remaining.len(),
        needle_penalty = use_penalty,
        "Starting dynamic-weight optimization."
    );
    reporter.report(Progress::TaskStart {
        total_steps: remaining.len() as u64,
    });

    if let Some(first) = index_of_min(remaining.iter().map(SeedPosition::weight)) {
        patient.insert_seed(remaining.remove(first))?;
        reporter.report(Progress::TaskIncrement);
    }

    loop {
        remaining.retain(|candidate| patient.is_position_free(candidate));
        if patient.target_coverage() >= goal || remaining.is_empty() {
            break;
        }

        let mut weights: Vec<f64> = remaining
            .iter()
            .map(|candidate| dynamic_weight(candidate, patient))
            .collect();
        let selected = if use_penalty {
            select_with_needle_penalty(patient, &remaining, &mut weights)
        } else {
            index_of_min(weights.iter().copied())
        };
        let Some(best) = selected else {
            break;
        };

        let seed = remaining.remove(best);
        debug!(
            x = seed.x(),
            y = seed.y(),
            z = seed.z(),
            weight = weights[best],
            "Inserting seed."
        );
        patient.insert_seed(seed)?;
        reporter.report(Progress::TaskIncrement);
    }

    reporter.report(Progress::TaskFinish);
    let outcome = PlanOutcome::from_patient(
        PlannerType::Dwdmm,
        start.elapsed().as_secs_f64(),
        patient,
        goal,
    );
    if !outcome.success {
        warn!(
            coverage = outcome.coverage,
            "The dynamic-weight planner did not reach the coverage goal."
        );
    }
    info!(
        seeds = outcome.seeds,
        needles = outcome.needles,
        coverage = outcome.coverage,
        "Dynamic-weight optimization finished."
    );
    Ok(outcome)
}
