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

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Prostate voxels still below the prescribed dose, with their current dose.
struct UncoveredVoxels {
    coordinates: Vec<[usize; 3]>,
    doses: Vec<f64>,
}

impl UncoveredVoxels {
    fn collect(patient: &Patient) -> Self {
        let mesh = patient.mesh();
        let prescribed = patient.prescribed_dose();
        let (coordinates, doses): (Vec<[usize; 3]>, Vec<f64>) = patient
            .masks()
            .prostate
            .iter()
            .zip(patient.dose_distribution())
            .enumerate()
            .filter(|(_, (inside, dose))| **inside && **dose < prescribed)
            .map(|(index, (_, &dose))| (mesh.coordinates(index), dose))
            .unzip();
        Self { coordinates, doses }
    }
}

/// Dose a candidate would add to uncovered prostate voxels, each voxel capped at
/// the dose it still needs.
fn coverage_gain(candidate: &SeedPosition, uncovered: &UncoveredVoxels, prescribed: f64) -> f64 {
    let kernel = candidate.source().kernel();
    let origin = candidate.indices();
    uncovered
        .coordinates
        .iter()
        .zip(&uncovered.doses)
        .map(|(&to, &current)| {
            let future = current + kernel.dose_between(origin, to);
            future.min(prescribed) - current
        })
        .sum()
}

/// Set-cover weight: static cost per unit of coverage gained. A candidate that
/// gains nothing has infinite weight.
pub fn set_cover_weight(candidate: &SeedPosition, patient: &Patient) -> f64 {
    let uncovered = UncoveredVoxels::collect(patient);
    weight_against(candidate, &uncovered, patient.prescribed_dose())
}

fn weight_against(candidate: &SeedPosition, uncovered: &UncoveredVoxels, prescribed: f64) -> f64 {
    let gain = coverage_gain(candidate, uncovered, prescribed);
    if gain == 0.0 {
        f64::INFINITY
    } else {
        candidate.weight() / gain
    }
}

fn update_weights(patient: &Patient, candidates: &[SeedPosition]) -> Vec<f64> {
    let uncovered = UncoveredVoxels::collect(patient);
    let prescribed = patient.prescribed_dose();

    #[cfg(not(feature = "parallel"))]
    let iterator = candidates.iter();

    #[cfg(feature = "parallel")]
    let iterator = candidates.par_iter();

    iterator
        .map(|candidate| weight_against(candidate, &uncovered, prescribed))
        .collect()
}

/// Set-cover greedy placement.
///
/// The first seed is the candidate with the lowest static weight. Afterwards every
/// remaining candidate is re-weighted by [`set_cover_weight`] and the cheapest one
/// is inserted, until the coverage goal is met or the candidates run out.
#[instrument(skip_all, name = "scm_planner")]
pub fn run(
    patient: &mut Patient,
    candidates: Vec<SeedPosition>,
    context: &PlanningContext,
) -> Result<PlanOutcome, EngineError> {
    let start = Instant::now();
    let goal = context.coverage_goal();
    let reporter = context.reporter;
    let mut remaining = candidates;

    info!(candidates = remaining.len(), "Starting set-cover optimization.");
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

        let weights = update_weights(patient, &remaining);
        let Some(best) = index_of_min(weights.iter().copied()) else {
            break;
        };
        if !weights[best].is_finite() {
            debug!("No remaining candidate adds coverage.");
            break;
        }

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
        PlannerType::Scm,
        start.elapsed().as_secs_f64(),
        patient,
        goal,
    );
    if !outcome.success {
        warn!(
            coverage = outcome.coverage,
            "The set-cover planner did not reach the coverage goal."
        );
    }
    info!(
        seeds = outcome.seeds,
        needles = outcome.needles,
        coverage = outcome.coverage,
        "Set-cover optimization finished."
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::fixtures;
    use crate::engine::config::PlanningConfigBuilder;
    use crate::engine::progress::ProgressReporter;

    fn config() -> crate::engine::config::PlanningConfig {
        PlanningConfigBuilder::new()
            .planner(PlannerType::Scm)
            .prescribed_dose(1000.0)
            .seed("Amersham6711Seed", 0.5)
            .build()
            .unwrap()
    }

    #[test]
    fn single_candidate_reaches_full_coverage_in_one_step() {
        let mut patient = fixtures::single_target_patient(14500.0);
        let source = fixtures::prepared_source(patient.mesh(), 1.0);
        let candidates = vec![SeedPosition::new([1, 1, 2], 1.0, source)];
        let config = config();
        let reporter = ProgressReporter::new();

        let outcome = run(&mut patient, candidates, &PlanningContext::new(&config, &reporter)).unwrap();

        assert_eq!(outcome.seeds, 1);
        assert!(outcome.success);
        assert!(outcome.coverage >= 0.98);
    }

    #[test]
    fn set_cover_weight_is_cost_over_capped_gain() {
        let mut patient = fixtures::block_patient(2000.0);
        let source = fixtures::prepared_source(patient.mesh(), 0.5);
        patient
            .insert_seed(SeedPosition::new([1, 1, 1], 1.0, source.clone()))
            .unwrap();
        let candidate = SeedPosition::new([3, 3, 1], 2.0, source.clone());

        let mesh = *patient.mesh();
        let mut gain = 0.0;
        for index in 0..mesh.voxel_count() {
            let current = patient.dose_at(index);
            if patient.masks().prostate[index] && current < 2000.0 {
                let add = source.kernel().dose_between([3, 3, 1], mesh.coordinates(index));
                gain += (current + add).min(2000.0) - current;
            }
        }

        let weight = set_cover_weight(&candidate, &patient);
        assert!((weight - 2.0 / gain).abs() <= 1e-12 * weight);
    }

    #[test]
    fn fully_covered_patient_gives_infinite_weight() {
        let mut patient = fixtures::single_target_patient(100.0);
        let source = fixtures::prepared_source(patient.mesh(), 1.0);
        patient
            .insert_seed(SeedPosition::new([1, 1, 2], 1.0, source.clone()))
            .unwrap();
        let candidate = SeedPosition::new([0, 0, 0], 1.0, source);
        assert_eq!(set_cover_weight(&candidate, &patient), f64::INFINITY);
    }

    #[test]
    fn planner_stops_once_goal_is_met() {
        let mut patient = fixtures::block_patient(3000.0);
        let source = fixtures::prepared_source(patient.mesh(), 0.5);
        let candidates: Vec<SeedPosition> = (0..patient.mesh().voxel_count())
            .filter(|&i| patient.masks().prostate[i])
            .map(|i| SeedPosition::new(patient.mesh().coordinates(i), 1.0, source.clone()))
            .collect();
        let total = candidates.len();
        let config = config();
        let reporter = ProgressReporter::new();

        let outcome = run(&mut patient, candidates, &PlanningContext::new(&config, &reporter)).unwrap();

        assert!(outcome.success);
        assert!(outcome.seeds <= total);
        let mut previous = patient.clone();
        previous.reset_state();
        let seeds = patient.treatment_plan().seeds().to_vec();
        for seed in &seeds[..seeds.len() - 1] {
            previous.insert_seed(seed.clone()).unwrap();
        }
        assert!(seeds.len() == 1 || previous.target_coverage() < 0.98);
    }
}
