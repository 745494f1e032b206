use crate::core::models::patient::Patient;
use crate::core::models::position::PreparedSource;
use crate::core::models::tissue::Organ;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-voxel adjoint responses of every structure for one source type.
///
/// `organ[v]` is the mean total dose the structure would receive from a single
/// source placed in voxel `v`. Values are only computed for prostate voxels; every
/// other voxel holds 0.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjointData {
    pub prostate: Vec<f64>,
    pub urethra: Vec<f64>,
    pub margin: Vec<f64>,
    pub rectum: Vec<f64>,
}

impl AdjointData {
    pub fn organ(&self, organ: Organ) -> &[f64] {
        match organ {
            Organ::Prostate => &self.prostate,
            Organ::Urethra => &self.urethra,
            Organ::Margin => &self.margin,
            Organ::Rectum => &self.rectum,
        }
    }

    pub(crate) fn from_organs(mut lookup: impl FnMut(Organ) -> Vec<f64>) -> Self {
        Self {
            prostate: lookup(Organ::Prostate),
            urethra: lookup(Organ::Urethra),
            margin: lookup(Organ::Margin),
            rectum: lookup(Organ::Rectum),
        }
    }
}

/// Computes the adjoint responses of all four structures for `source`.
#[instrument(skip_all, name = "adjoint_generation_task", fields(seed = source.name()))]
pub fn generate(patient: &Patient, source: &PreparedSource, reporter: &ProgressReporter) -> AdjointData {
    info!("Generating adjoint data.");
    reporter.report(Progress::TaskStart {
        total_steps: Organ::ALL.len() as u64,
    });
    let data = AdjointData::from_organs(|organ| {
        let values = condensed_adjoint_dose(patient, source, organ);
        reporter.report(Progress::TaskIncrement);
        values
    });
    reporter.report(Progress::TaskFinish);
    data
}

/// Mean total dose over `organ` from a source at each prostate voxel.
///
/// An empty structure yields 0 everywhere.
pub fn condensed_adjoint_dose(patient: &Patient, source: &PreparedSource, organ: Organ) -> Vec<f64> {
    let mesh = *patient.mesh();
    let masks = patient.masks();
    let organ_voxels: Vec<[usize; 3]> = masks
        .mask(organ)
        .iter()
        .enumerate()
        .filter(|(_, inside)| **inside)
        .map(|(index, _)| mesh.coordinates(index))
        .collect();

    debug!(organ = %organ, voxels = organ_voxels.len(), "Condensing adjoint dose");
    let mut values = vec![0.0; mesh.voxel_count()];
    if organ_voxels.is_empty() {
        return values;
    }

    let kernel = source.kernel();
    let count = organ_voxels.len() as f64;
    let prostate = &masks.prostate;

    #[cfg(not(feature = "parallel"))]
    let iterator = values.iter_mut();

    #[cfg(feature = "parallel")]
    let iterator = values.par_iter_mut();

    iterator.enumerate().for_each(|(index, value)| {
        if prostate[index] {
            let origin = mesh.coordinates(index);
            let total: f64 = organ_voxels
                .iter()
                .map(|&to| kernel.dose_between(origin, to))
                .sum();
            *value = total / count;
        }
    });

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::fixtures;

    #[test]
    fn adjoint_dose_is_mean_organ_dose_from_each_prostate_voxel() {
        let patient = fixtures::block_patient(1000.0);
        let source = fixtures::prepared_source(patient.mesh(), 0.5);
        let mesh = *patient.mesh();
        let values = condensed_adjoint_dose(&patient, &source, Organ::Rectum);

        let origin = [1, 3, 2];
        let rectum: Vec<[usize; 3]> = (0..mesh.voxel_count())
            .filter(|&i| patient.masks().rectum[i])
            .map(|i| mesh.coordinates(i))
            .collect();
        let expected = rectum
            .iter()
            .map(|&to| source.instance().total_dose(
                (to[0] as f64 - origin[0] as f64) * 0.5,
                (to[1] as f64 - origin[1] as f64) * 0.5,
                (to[2] as f64 - origin[2] as f64) * 0.5,
            ))
            .sum::<f64>()
            / rectum.len() as f64;

        let actual = values[mesh.flat_index(1, 3, 2)];
        assert!((actual - expected).abs() <= 1e-9 * expected);
    }

    #[test]
    fn adjoint_dose_is_zero_outside_prostate() {
        let patient = fixtures::block_patient(1000.0);
        let source = fixtures::prepared_source(patient.mesh(), 0.5);
        let values = condensed_adjoint_dose(&patient, &source, Organ::Urethra);
        for (index, value) in values.iter().enumerate() {
            if patient.masks().prostate[index] {
                assert!(*value > 0.0);
            } else {
                assert_eq!(*value, 0.0);
            }
        }
    }

    #[test]
    fn adjoint_dose_of_empty_organ_is_zero() {
        let patient = fixtures::single_target_patient(1000.0);
        let source = fixtures::prepared_source(patient.mesh(), 0.5);
        let values = condensed_adjoint_dose(&patient, &source, Organ::Rectum);
        assert!(values.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn generate_fills_every_organ() {
        let patient = fixtures::block_patient(1000.0);
        let source = fixtures::prepared_source(patient.mesh(), 0.5);
        let data = generate(&patient, &source, &ProgressReporter::new());
        for organ in Organ::ALL {
            assert_eq!(data.organ(organ).len(), patient.mesh().voxel_count());
        }
        assert_eq!(data.margin, condensed_adjoint_dose(&patient, &source, Organ::Margin));
    }
}
