use crate::core::io::store::PatientDataStore;
use crate::core::models::patient::Patient;
use crate::core::models::position::PreparedSource;
use crate::core::models::tissue::Organ;
use crate::core::seeds::catalog::SeedCatalog;
use crate::core::seeds::source::SourceInstance;
use crate::engine::cache;
use crate::engine::config::{PlannerType, PlanningConfig, SeedSpec};
use crate::engine::context::PlanningContext;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::PlanOutcome;
use crate::engine::tasks::{self, adjoint::AdjointData};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct PlanningResult {
    /// Patient state holding the final plan and its dose distribution.
    pub patient: Patient,
    pub outcome: PlanOutcome,
}

/// Runs a full planning pass against `store`.
///
/// Adjoint data missing from the store is generated and written back, so a second
/// run on the same store skips the generation phase.
///
/// # Errors
///
/// Returns [`EngineError::UnknownSeedType`] for a seed name missing from `catalog`,
/// [`EngineError::InvalidInput`] for a patient without prostate voxels and
/// [`EngineError::NoCandidates`] when no prostate voxel lies on an active
/// needle-template column. Store and patient failures are propagated.
#[instrument(skip_all, name = "planning_workflow", fields(planner = %config.planner))]
pub fn run<S>(
    store: &mut S,
    catalog: &SeedCatalog,
    config: &PlanningConfig,
    reporter: &ProgressReporter,
) -> Result<PlanningResult, EngineError>
where
    S: PatientDataStore + ?Sized,
{
    // === Phase 0: Loading Patient ===
    reporter.report(Progress::PhaseStart {
        name: "Loading Patient",
    });
    let instances = resolve_sources(catalog, config)?;
    let mut patient = store.load_patient_data()?.into_patient(config.prescribed_dose)?;
    if patient.organ_size(Organ::Prostate) == 0 {
        return Err(EngineError::InvalidInput(
            "patient has no prostate voxels".to_string(),
        ));
    }
    info!(
        dimensions = ?patient.mesh().dimensions(),
        prostate_volume_cm3 = patient.organ_volume(Organ::Prostate),
        prescribed_dose = patient.prescribed_dose(),
        "Patient loaded."
    );
    let sources: Vec<Arc<PreparedSource>> = instances
        .into_iter()
        .map(|instance| Arc::new(PreparedSource::new(instance, patient.mesh(), config.radius_floor)))
        .collect();
    reporter.report(Progress::PhaseFinish);

    // === Phase 1: Adjoint Data ===
    reporter.report(Progress::PhaseStart {
        name: "Adjoint Data",
    });
    let mut prepared: Vec<(Arc<PreparedSource>, AdjointData)> = Vec::with_capacity(sources.len());
    for source in sources {
        let data = cache::load_or_generate(store, &patient, &source, reporter)?;
        prepared.push((source, data));
    }
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Candidate Enumeration ===
    reporter.report(Progress::PhaseStart {
        name: "Candidate Enumeration",
    });
    let candidates = tasks::candidates::enumerate(&patient, &prepared, &config.weights);
    if candidates.is_empty() {
        return Err(EngineError::NoCandidates(
            "no prostate voxel lies on an active needle-template column".to_string(),
        ));
    }
    info!(count = candidates.len(), "Candidate seed positions ranked.");
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Optimization ===
    reporter.report(Progress::PhaseStart {
        name: "Optimization",
    });
    let context = PlanningContext::new(config, reporter);
    let outcome = match config.planner {
        PlannerType::Iiem => tasks::iiem::run(&mut patient, candidates, &context)?,
        PlannerType::Dwdmm => tasks::dwdmm::run(&mut patient, candidates, &context)?,
        PlannerType::Scm => tasks::scm::run(&mut patient, candidates, &context)?,
    };
    reporter.report(Progress::PhaseFinish);

    info!(
        success = outcome.success,
        coverage = outcome.coverage,
        seeds = outcome.seeds,
        needles = outcome.needles,
        elapsed_secs = outcome.elapsed_secs,
        "Planning finished."
    );
    Ok(PlanningResult { patient, outcome })
}

/// Creates a source for every requested seed. IIEM plans with a single seed type,
/// so only the first entry is used for it.
fn resolve_sources(
    catalog: &SeedCatalog,
    config: &PlanningConfig,
) -> Result<Vec<SourceInstance>, EngineError> {
    let specs: &[SeedSpec] = match config.planner {
        PlannerType::Iiem if config.seeds.len() > 1 => {
            warn!(
                seed = %config.seeds[0].name,
                ignored = config.seeds.len() - 1,
                "IIEM plans with a single seed type; extra seed types are ignored."
            );
            &config.seeds[..1]
        }
        _ => &config.seeds,
    };
    specs
        .iter()
        .map(|spec| {
            catalog
                .create_source(&spec.name, spec.strength)
                .map_err(EngineError::from)
        })
        .collect()
}
