use crate::core::models::patient::Patient;
use crate::core::models::position::SeedPosition;
use crate::core::models::tissue::Organ;
use crate::engine::config::PlannerType;
use crate::engine::context::PlanningContext;
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use crate::engine::state::PlanOutcome;
use crate::engine::transaction;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const ISODOSE_STEP: f64 = 0.001;

const NEEDLE_COARSE_START: f64 = 1.02;
const NEEDLE_COARSE_STEP: f64 = 0.02;
const NEEDLE_COARSE_STEPS: usize = 3;

const NEEDLE_REFINED_SPAN: f64 = 0.019;
const NEEDLE_REFINED_STEP: f64 = 0.001;
const NEEDLE_REFINED_STEPS: usize = 19;

/// Heuristic lower bound on the number of needles for a target of
/// `volume_cm3`: `floor(0.24·V + 11.33)`.
pub fn minimum_needles(volume_cm3: f64) -> usize {
    (0.24 * volume_cm3 + 11.33).floor().max(0.0) as usize
}

/// Smallest fraction of the prescription that any single candidate delivers to
/// the prostate on its own, each voxel capped at the prescribed dose.
///
/// Returns `None` when there are no candidates or the prostate is empty.
pub fn min_isodose_constant(patient: &Patient, candidates: &[SeedPosition]) -> Option<f64> {
    let mesh = *patient.mesh();
    let prescribed = patient.prescribed_dose();
    let prostate: Vec<[usize; 3]> = patient
        .masks()
        .prostate
        .iter()
        .enumerate()
        .filter(|(_, inside)| **inside)
        .map(|(index, _)| mesh.coordinates(index))
        .collect();
    if prostate.is_empty() || candidates.is_empty() {
        return None;
    }
    let normalization = prostate.len() as f64 * prescribed;

    #[cfg(not(feature = "parallel"))]
    let iterator = candidates.iter();

    #[cfg(feature = "parallel")]
    let iterator = candidates.par_iter();

    let constants: Vec<f64> = iterator
        .map(|candidate| {
            let kernel = candidate.source().kernel();
            let origin = candidate.indices();
            let delivered: f64 = prostate
                .iter()
                .map(|&to| kernel.dose_between(origin, to).min(prescribed))
                .sum();
            delivered / normalization
        })
        .collect();

    constants.into_iter().reduce(f64::min)
}

/// Greedy needle placement for one isodose constant.
///
/// Starts from an empty plan with the best-ranked candidate and keeps inserting
/// the first remaining candidate whose current dose is below
/// `Dp · constant · needles_used`, until `needle_goal` needles are in use or no
/// candidate qualifies. Returns the candidates that were not inserted.
fn place_needles(
    patient: &mut Patient,
    ranked: &[SeedPosition],
    constant: f64,
    needle_goal: usize,
) -> Result<Vec<SeedPosition>, EngineError> {
    patient.reset_state();
    let mut remaining = ranked.to_vec();
    if remaining.is_empty() {
        return Ok(remaining);
    }
    patient.insert_seed(remaining.remove(0))?;

    while patient.num_needles() < needle_goal {
        let cutoff = patient.prescribed_dose() * constant * patient.num_needles() as f64;
        let next = remaining.iter().position(|candidate| {
            patient.is_position_free(candidate) && patient.dose_at_position(candidate) < cutoff
        });
        match next {
            Some(index) => patient.insert_seed(remaining.remove(index))?,
            None => break,
        }
    }
    Ok(remaining)
}

/// Fills the already-used needles until the coverage goal is met.
///
/// Each constant is tried in order; a candidate qualifies when it lies on a used
/// needle and its current dose is below `Dp · constant`. A constant that cannot
/// reach the goal is rolled back before the next one is tried. Returns the first
/// constant that succeeded.
fn needle_iteration<I>(
    patient: &mut Patient,
    remaining: &[SeedPosition],
    constants: I,
    goal: f64,
) -> Result<Option<f64>, EngineError>
where
    I: IntoIterator<Item = f64>,
{
    for constant in constants {
        let accepted = transaction::trial(patient, |patient| {
            let cutoff = patient.prescribed_dose() * constant;
            let mut list = remaining.to_vec();
            while patient.target_coverage() < goal {
                let next = list.iter().position(|candidate| {
                    patient.is_seed_on_needle(candidate)
                        && patient.is_position_free(candidate)
                        && patient.dose_at_position(candidate) < cutoff
                });
                match next {
                    Some(index) => patient.insert_seed(list.remove(index))?,
                    None => return Ok(None),
                }
            }
            Ok(Some(constant))
        })?;
        if let Some(constant) = accepted {
            debug!(constant, "Needle isodose constant reached the coverage goal.");
            return Ok(Some(constant));
        }
    }
    Ok(None)
}

fn coarse_needle_constants() -> impl Iterator<Item = f64> {
    (0..=NEEDLE_COARSE_STEPS).map(|n| NEEDLE_COARSE_START + n as f64 * NEEDLE_COARSE_STEP)
}

/// Sweeps up to `best` from below. The last constant is `best` itself, so the
/// refined pass always retries the coarse winner.
fn refined_needle_constants(best: f64) -> impl Iterator<Item = f64> {
    let start = best - NEEDLE_REFINED_SPAN;
    (0..NEEDLE_REFINED_STEPS)
        .map(move |n| start + n as f64 * NEEDLE_REFINED_STEP)
        .chain(std::iter::once(best))
}

/// Isodose-exclusion sweep.
///
/// For each needle goal from the volume heuristic up to the configured cap, the
/// isodose constant is swept upward until a placement uses exactly that many
/// needles. The used needles are then filled under a coarse and a refined needle
/// isodose sweep. The first needle goal that reaches the coverage goal wins.
#[instrument(skip_all, name = "iiem_planner")]
pub fn run(
    patient: &mut Patient,
    candidates: Vec<SeedPosition>,
    context: &PlanningContext,
) -> Result<PlanOutcome, EngineError> {
    let start = Instant::now();
    let goal = context.coverage_goal();
    let cap = context.config.max_needles;
    let reporter = context.reporter;

    let mut ranked = candidates;
    ranked.sort_by(|a, b| a.weight().total_cmp(&b.weight()));

    let first_goal = minimum_needles(patient.organ_volume(Organ::Prostate)).min(cap);
    let max_constant = min_isodose_constant(patient, &ranked).unwrap_or(0.0);
    let isodose_steps = (max_constant / ISODOSE_STEP).floor() as usize;

    info!(
        candidates = ranked.len(),
        first_needle_goal = first_goal,
        needle_cap = cap,
        isodose_steps,
        "Starting isodose-exclusion optimization."
    );
    reporter.report(Progress::TaskStart {
        total_steps: (cap + 1 - first_goal) as u64,
    });

    let mut solved = false;
    'needles: for needle_goal in first_goal..=cap {
        debug!(needle_goal, "Trying needle goal.");
        for step in 1..=isodose_steps {
            let constant = step as f64 * ISODOSE_STEP;
            let remaining = place_needles(patient, &ranked, constant, needle_goal)?;
            if patient.num_needles() != needle_goal {
                continue;
            }

            patient.save_state();
            let Some(best) =
                needle_iteration(patient, &remaining, coarse_needle_constants(), goal)?
            else {
                continue;
            };

            patient.load_saved_state();
            let refined =
                match needle_iteration(patient, &remaining, refined_needle_constants(best), goal)? {
                    Some(refined) => refined,
                    None => {
                        warn!(best, "Refined needle sweep failed; keeping the coarse constant.");
                        patient.load_saved_state();
                        match needle_iteration(patient, &remaining, [best], goal)? {
                            Some(best) => best,
                            None => {
                                patient.load_saved_state();
                                continue;
                            }
                        }
                    }
                };
            info!(
                needle_goal,
                isodose_constant = constant,
                needle_constant = refined,
                "Coverage goal reached."
            );
            solved = true;
            reporter.report(Progress::TaskIncrement);
            break 'needles;
        }
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    let outcome = PlanOutcome::from_patient(
        PlannerType::Iiem,
        start.elapsed().as_secs_f64(),
        patient,
        goal,
    );
    if !solved {
        warn!(
            coverage = outcome.coverage,
            "The isodose-exclusion planner did not reach the coverage goal."
        );
    }
    info!(
        seeds = outcome.seeds,
        needles = outcome.needles,
        coverage = outcome.coverage,
        "Isodose-exclusion optimization finished."
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::fixtures;
    use crate::core::models::tissue::TissueType;
    use crate::engine::config::{PlanningConfig, PlanningConfigBuilder};
    use crate::engine::progress::ProgressReporter;
    use std::collections::HashSet;

    fn config(prescribed: f64, max_needles: usize) -> PlanningConfig {
        PlanningConfigBuilder::new()
            .planner(PlannerType::Iiem)
            .prescribed_dose(prescribed)
            .seed("Amersham6711Seed", 0.5)
            .max_needles(max_needles)
            .build()
            .unwrap()
    }

    fn prostate_candidates(patient: &Patient, strength: f64) -> Vec<SeedPosition> {
        let source = fixtures::prepared_source(patient.mesh(), strength);
        let mesh = *patient.mesh();
        (0..mesh.voxel_count())
            .filter(|&i| patient.masks().prostate[i])
            .map(|i| SeedPosition::new(mesh.coordinates(i), 1.0 + (i % 5) as f64, source.clone()))
            .collect()
    }

    #[test]
    fn minimum_needles_follows_volume_heuristic() {
        assert_eq!(minimum_needles(0.0), 11);
        assert_eq!(minimum_needles(3.0), 12);
        assert_eq!(minimum_needles(10.0), 13);
        assert_eq!(minimum_needles(40.0), 20);
    }

    #[test]
    fn min_isodose_constant_is_a_fraction_of_prescription() {
        let patient = fixtures::block_patient(3000.0);
        let candidates = prostate_candidates(&patient, 0.5);
        let constant = min_isodose_constant(&patient, &candidates).unwrap();
        assert!(constant > 0.0 && constant <= 1.0);

        let single = min_isodose_constant(&patient, &candidates[..1]).unwrap();
        assert!(constant <= single);
    }

    #[test]
    fn min_isodose_constant_without_candidates_is_none() {
        let patient = fixtures::block_patient(3000.0);
        assert_eq!(min_isodose_constant(&patient, &[]), None);
    }

    #[test]
    fn coarse_and_refined_constants_cover_expected_ranges() {
        let coarse: Vec<f64> = coarse_needle_constants().collect();
        assert_eq!(coarse.len(), 4);
        assert!((coarse[0] - 1.02).abs() < 1e-12);
        assert!((coarse[3] - 1.08).abs() < 1e-12);

        let refined: Vec<f64> = refined_needle_constants(1.04).collect();
        assert_eq!(refined.len(), 20);
        assert!((refined[0] - 1.021).abs() < 1e-12);
        assert!((refined[19] - 1.04).abs() < 1e-12);
    }

    #[test]
    fn refined_sweep_ends_exactly_on_every_coarse_constant() {
        for best in coarse_needle_constants() {
            let refined: Vec<f64> = refined_needle_constants(best).collect();
            assert_eq!(refined.last().copied(), Some(best));
            assert!(refined.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn place_needles_starts_from_best_ranked_candidate() {
        let mut patient = fixtures::block_patient(3000.0);
        let ranked = prostate_candidates(&patient, 0.5);
        let remaining = place_needles(&mut patient, &ranked, 0.001, 3).unwrap();

        assert_eq!(patient.treatment_plan().seeds()[0], ranked[0]);
        assert_eq!(remaining.len() + patient.num_seeds(), ranked.len());
    }

    #[test]
    fn single_voxel_target_is_solved_with_one_needle() {
        let mut patient = fixtures::single_target_patient(14500.0);
        let source = fixtures::prepared_source(patient.mesh(), 1.0);
        let candidates = vec![SeedPosition::new([1, 1, 2], 1.0, source)];
        let config = config(14500.0, 1);
        let reporter = ProgressReporter::new();

        let outcome =
            run(&mut patient, candidates, &PlanningContext::new(&config, &reporter)).unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.seeds, 1);
        assert_eq!(outcome.needles, 1);
    }

    #[test]
    fn plan_respects_template_and_needle_cap() {
        let mut patient = fixtures::block_patient(3000.0);
        let candidates = prostate_candidates(&patient, 0.5);
        let config = config(3000.0, 4);
        let reporter = ProgressReporter::new();

        let outcome =
            run(&mut patient, candidates, &PlanningContext::new(&config, &reporter)).unwrap();

        let seeds = patient.treatment_plan().seeds();
        let unique: HashSet<_> = seeds.iter().map(|s| s.indices()).collect();
        assert_eq!(unique.len(), seeds.len());
        for seed in seeds {
            let [x, y, z] = seed.indices();
            assert!(patient.is_needle_column(x, y));
            assert_eq!(patient.tissue_type(x, y, z), TissueType::Prostate);
        }
        assert!(outcome.success);
        assert!(patient.target_coverage() >= 0.98);
        assert!(outcome.needles <= 4);
        assert_eq!(outcome.needles, patient.num_needles());
    }
}
