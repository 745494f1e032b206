use super::error::EngineError;
use super::progress::ProgressReporter;
use super::tasks::adjoint::{self, AdjointData};
use crate::core::io::store::PatientDataStore;
use crate::core::models::patient::Patient;
use crate::core::models::position::PreparedSource;
use crate::core::models::tissue::Organ;
use tracing::{info, warn};

/// Returns the adjoint data of `source`, preferring the store's cache.
///
/// A cache hit requires all four structures to be present. On a miss the data is
/// generated and written back to the store, normalized to unit strength. A failed
/// write-back is logged and does not abort planning.
pub fn load_or_generate<S>(
    store: &mut S,
    patient: &Patient,
    source: &PreparedSource,
    reporter: &ProgressReporter,
) -> Result<AdjointData, EngineError>
where
    S: PatientDataStore + ?Sized,
{
    let instance = source.instance();
    let voxels = patient.mesh().voxel_count();

    let mut cached = Vec::with_capacity(Organ::ALL.len());
    for organ in Organ::ALL {
        match store.load_adjoint(instance, organ, voxels)? {
            Some(values) => cached.push(values),
            None => break,
        }
    }

    if cached.len() == Organ::ALL.len() {
        info!(seed = source.name(), "Using cached adjoint data.");
        let mut values = cached.into_iter();
        return Ok(AdjointData::from_organs(|_| values.next().unwrap_or_default()));
    }

    info!(seed = source.name(), "Adjoint data not cached; generating.");
    let data = adjoint::generate(patient, source, reporter);
    for organ in Organ::ALL {
        if let Err(e) = store.store_adjoint(instance, organ, data.organ(organ)) {
            warn!(seed = source.name(), organ = %organ, error = %e, "Failed to cache adjoint data.");
        }
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::store::{InMemoryStore, PatientData, adjoint_key};
    use crate::core::models::fixtures;

    fn store_for(patient: &Patient) -> InMemoryStore {
        InMemoryStore::new(PatientData {
            mesh: *patient.mesh(),
            masks: patient.masks().clone(),
            needle_template: patient.needle_template().to_vec(),
        })
    }

    #[test]
    fn cache_miss_generates_and_stores_normalized_data() {
        let patient = fixtures::block_patient(1000.0);
        let source = fixtures::prepared_source(patient.mesh(), 0.5);
        let mut store = store_for(&patient);

        let data = load_or_generate(&mut store, &patient, &source, &ProgressReporter::new()).unwrap();

        let index = patient.mesh().flat_index(1, 1, 1);
        let stored = store
            .load_array(&adjoint_key("Amersham6711Seed", Organ::Urethra))
            .unwrap()
            .unwrap();
        assert!((stored[index] - data.urethra[index] / 0.5).abs() <= 1e-12 * stored[index]);
    }

    #[test]
    fn cache_hit_scales_stored_data_by_strength() {
        let patient = fixtures::single_target_patient(1000.0);
        let source = fixtures::prepared_source(patient.mesh(), 0.5);
        let voxels = patient.mesh().voxel_count();
        let mut store = store_for(&patient);
        for organ in Organ::ALL {
            store = store.with_array(adjoint_key("Amersham6711Seed", organ), vec![1.0; voxels]);
        }

        let data = load_or_generate(&mut store, &patient, &source, &ProgressReporter::new()).unwrap();
        assert!(data.prostate.iter().all(|&v| v == 0.5));
        assert!(data.rectum.iter().all(|&v| v == 0.5));
    }

    #[test]
    fn partial_cache_is_regenerated() {
        let patient = fixtures::single_target_patient(1000.0);
        let source = fixtures::prepared_source(patient.mesh(), 1.0);
        let voxels = patient.mesh().voxel_count();
        let mut store = store_for(&patient)
            .with_array(adjoint_key("Amersham6711Seed", Organ::Prostate), vec![7.0; voxels]);

        let data = load_or_generate(&mut store, &patient, &source, &ProgressReporter::new()).unwrap();
        assert!(data.prostate.iter().all(|&v| v != 7.0));
        assert!(store.contains_key(&adjoint_key("Amersham6711Seed", Organ::Rectum)));
    }
}
