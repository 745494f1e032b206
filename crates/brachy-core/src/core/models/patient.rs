use super::PatientError;
use super::mesh::MeshGeometry;
use super::plan::{Snapshot, TreatmentPlan};
use super::position::SeedPosition;
use super::tissue::{Organ, TissueMasks, TissueType};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Voxelized anatomy plus the mutable dose field and treatment plan built on it.
///
/// The anatomy (mesh, masks, needle template, prescription) is fixed at
/// construction. Only [`Patient::insert_seed`] and the snapshot operations mutate
/// the dose distribution and plan.
#[derive(Debug, Clone)]
pub struct Patient {
    mesh: MeshGeometry,
    masks: TissueMasks,
    needle_template: Vec<bool>,
    prescribed_dose: f64,
    dose: Vec<f64>,
    plan: TreatmentPlan,
    saved: Snapshot,
}

impl Patient {
    pub fn new(
        mesh: MeshGeometry,
        masks: TissueMasks,
        needle_template: Vec<bool>,
        prescribed_dose: f64,
    ) -> Result<Self, PatientError> {
        if !(prescribed_dose > 0.0 && prescribed_dose.is_finite()) {
            return Err(PatientError::InvalidPrescribedDose(prescribed_dose));
        }

        let voxels = mesh.voxel_count();
        for organ in Organ::ALL {
            check_len(organ.as_str(), voxels, masks.mask(organ).len())?;
        }
        check_len("needle-template", mesh.column_count(), needle_template.len())?;

        let dose = vec![0.0; voxels];
        Ok(Self {
            mesh,
            masks,
            needle_template,
            prescribed_dose,
            saved: Snapshot {
                plan: TreatmentPlan::new(),
                dose: dose.clone(),
            },
            dose,
            plan: TreatmentPlan::new(),
        })
    }

    pub fn mesh(&self) -> &MeshGeometry {
        &self.mesh
    }

    pub fn masks(&self) -> &TissueMasks {
        &self.masks
    }

    pub fn needle_template(&self) -> &[bool] {
        &self.needle_template
    }

    /// Prescribed dose in cGy.
    pub fn prescribed_dose(&self) -> f64 {
        self.prescribed_dose
    }

    pub fn dose_distribution(&self) -> &[f64] {
        &self.dose
    }

    pub fn treatment_plan(&self) -> &TreatmentPlan {
        &self.plan
    }

    pub fn num_seeds(&self) -> usize {
        self.plan.num_seeds()
    }

    pub fn num_needles(&self) -> usize {
        self.plan.num_needles()
    }

    #[inline]
    pub fn dose_at(&self, index: usize) -> f64 {
        self.dose[index]
    }

    /// Current dose at the voxel a position occupies.
    #[inline]
    pub fn dose_at_position(&self, position: &SeedPosition) -> f64 {
        let [i, j, k] = position.indices();
        self.dose[self.mesh.flat_index(i, j, k)]
    }

    pub fn is_needle_column(&self, i: usize, j: usize) -> bool {
        self.needle_template[self.mesh.column_index(i, j)]
    }

    pub fn is_seed_on_needle(&self, position: &SeedPosition) -> bool {
        self.plan
            .uses_needle(self.mesh.column_index(position.x(), position.y()))
    }

    pub fn is_position_free(&self, position: &SeedPosition) -> bool {
        !self.plan.is_occupied(position.indices())
    }

    /// Superposes the dose of a seed at `position` onto the distribution and
    /// appends it to the plan.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::OutOfRange`] if the indices lie outside the mesh and
    /// [`PatientError::PositionOccupied`] if a seed already sits in that voxel.
    /// A source whose kernel was tabulated on another mesh gives
    /// [`PatientError::KernelMismatch`].
    pub fn insert_seed(&mut self, position: SeedPosition) -> Result<(), PatientError> {
        let indices = position.indices();
        let [i, j, k] = indices;
        if !self.mesh.contains(i, j, k) {
            return Err(PatientError::OutOfRange { indices });
        }
        if !self.is_position_free(&position) {
            return Err(PatientError::PositionOccupied { indices });
        }

        let kernel = position.source().kernel();
        if kernel.mesh() != &self.mesh {
            return Err(PatientError::KernelMismatch {
                seed: position.source().name().to_string(),
                kernel: kernel.mesh().dimensions(),
                patient: self.mesh.dimensions(),
            });
        }
        if self.plan.is_empty() {
            kernel.fill_field(&self.mesh, indices, &mut self.dose);
        } else {
            let mesh = self.mesh;

            #[cfg(not(feature = "parallel"))]
            let iterator = self.dose.iter_mut();

            #[cfg(feature = "parallel")]
            let iterator = self.dose.par_iter_mut();

            iterator.enumerate().for_each(|(index, value)| {
                *value += kernel.dose_between(indices, mesh.coordinates(index));
            });
        }

        let column = self.mesh.column_index(i, j);
        self.plan.push(position, column);
        Ok(())
    }

    /// Fraction of the voxels in `mask` whose dose meets or exceeds `threshold`.
    /// An empty structure has coverage 0.
    pub fn coverage_fraction(&self, mask: &[bool], threshold: f64) -> f64 {
        let (total, covered) = mask
            .iter()
            .zip(&self.dose)
            .filter(|(inside, _)| **inside)
            .fold((0usize, 0usize), |(total, covered), (_, &dose)| {
                (total + 1, covered + usize::from(dose >= threshold))
            });
        if total == 0 {
            0.0
        } else {
            covered as f64 / total as f64
        }
    }

    pub fn organ_coverage(&self, organ: Organ, threshold: f64) -> f64 {
        self.coverage_fraction(self.masks.mask(organ), threshold)
    }

    /// Fraction of the prostate receiving at least the prescribed dose.
    pub fn target_coverage(&self) -> f64 {
        self.organ_coverage(Organ::Prostate, self.prescribed_dose)
    }

    pub fn organ_size(&self, organ: Organ) -> usize {
        self.masks.count(organ)
    }

    /// Voxels outside prostate, urethra and rectum. Margin voxels count as normal.
    pub fn normal_size(&self) -> usize {
        let total = self.mesh.voxel_count();
        total.saturating_sub(
            self.organ_size(Organ::Prostate)
                + self.organ_size(Organ::Urethra)
                + self.organ_size(Organ::Rectum),
        )
    }

    /// Organ volume in cm³.
    pub fn organ_volume(&self, organ: Organ) -> f64 {
        self.organ_size(organ) as f64 * self.mesh.voxel_volume()
    }

    pub fn tissue_type(&self, i: usize, j: usize, k: usize) -> TissueType {
        self.masks.tissue_type(self.mesh.flat_index(i, j, k))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            plan: self.plan.clone(),
            dose: self.dose.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.plan = snapshot.plan;
        self.dose = snapshot.dose;
    }

    /// Stores a copy of the current plan and dose as the saved state.
    pub fn save_state(&mut self) {
        self.saved = self.snapshot();
    }

    /// Reverts to the last saved state, or to an empty plan if nothing was saved.
    pub fn load_saved_state(&mut self) {
        self.plan = self.saved.plan.clone();
        self.dose.copy_from_slice(&self.saved.dose);
    }

    /// Clears the plan and zeroes the dose distribution. The saved state is kept.
    pub fn reset_state(&mut self) {
        self.plan = TreatmentPlan::new();
        self.dose.fill(0.0);
    }
}

fn check_len(name: &str, expected: usize, actual: usize) -> Result<(), PatientError> {
    if expected == actual {
        Ok(())
    } else {
        Err(PatientError::ShapeMismatch {
            name: name.to_string(),
            expected,
            actual,
        })
    }
}
