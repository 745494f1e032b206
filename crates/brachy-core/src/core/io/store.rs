use super::DataStoreError;
use crate::core::models::PatientError;
use crate::core::models::mesh::MeshGeometry;
use crate::core::models::patient::Patient;
use crate::core::models::tissue::{Organ, TissueMasks};
use crate::core::seeds::source::SourceInstance;
use std::collections::HashMap;

const ADJOINT_PREFIX: &str = "/adjoint_data/";
const ADJOINT_SUFFIX: &str = "_adjoint_data";

/// Static anatomy loaded from a data store: everything a [`Patient`] needs except
/// the prescription.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientData {
    pub mesh: MeshGeometry,
    pub masks: TissueMasks,
    pub needle_template: Vec<bool>,
}

impl PatientData {
    /// Builds a fresh patient with an empty plan and zero dose.
    pub fn into_patient(self, prescribed_dose: f64) -> Result<Patient, PatientError> {
        Patient::new(self.mesh, self.masks, self.needle_template, prescribed_dose)
    }
}

/// Key of the cached adjoint array of `organ` for one seed type.
pub fn adjoint_key(seed_name: &str, organ: Organ) -> String {
    format!("{ADJOINT_PREFIX}{seed_name}/{organ}{ADJOINT_SUFFIX}")
}

/// Cache entry name of a source. A tilted source axis changes the dose field, so
/// the orientation angle (radians) qualifies the seed name when it is non-zero.
/// Strength is normalized out of cached arrays and does not enter the name.
pub fn adjoint_entry(source: &SourceInstance) -> String {
    match source.orientation() {
        Some(angle) if angle != 0.0 => format!("{}@{}", source.name(), angle),
        _ => source.name().to_string(),
    }
}

/// Splits an adjoint key into its seed name and organ.
pub(crate) fn parse_adjoint_key(key: &str) -> Option<(&str, Organ)> {
    let rest = key.strip_prefix(ADJOINT_PREFIX)?;
    let (seed, leaf) = rest.split_once('/')?;
    let organ_name = leaf.strip_suffix(ADJOINT_SUFFIX)?;
    let organ = Organ::ALL.into_iter().find(|o| o.as_str() == organ_name)?;
    if seed.is_empty() {
        None
    } else {
        Some((seed, organ))
    }
}

/// Key-to-array access to a patient's data container.
///
/// Implementations provide the anatomy and raw array storage. Adjoint caching is
/// layered on top through the provided methods, which keep arrays normalized to a
/// unit source strength.
pub trait PatientDataStore {
    /// Loads mesh geometry, organ masks and the needle template.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry is missing or has the wrong shape.
    fn load_patient_data(&self) -> Result<PatientData, DataStoreError>;

    /// Loads a named array, or `None` if the key is absent.
    fn load_array(&self, key: &str) -> Result<Option<Vec<f64>>, DataStoreError>;

    /// Stores a named array, replacing any previous value.
    fn store_array(&mut self, key: &str, values: &[f64]) -> Result<(), DataStoreError>;

    /// Loads the cached adjoint array of `organ` for `source`, scaled to the
    /// source's strength.
    ///
    /// # Arguments
    ///
    /// * `source` - The source the adjoint data was generated for.
    /// * `organ` - The structure whose response is requested.
    /// * `expected_len` - The voxel count of the patient mesh.
    ///
    /// # Return
    ///
    /// Returns `None` on a cache miss.
    ///
    /// # Errors
    ///
    /// Returns [`DataStoreError::ShapeMismatch`] if the cached array does not
    /// match the mesh.
    fn load_adjoint(
        &self,
        source: &SourceInstance,
        organ: Organ,
        expected_len: usize,
    ) -> Result<Option<Vec<f64>>, DataStoreError> {
        let key = adjoint_key(&adjoint_entry(source), organ);
        let Some(mut values) = self.load_array(&key)? else {
            return Ok(None);
        };
        if values.len() != expected_len {
            return Err(DataStoreError::ShapeMismatch {
                key,
                expected: expected_len,
                actual: values.len(),
            });
        }
        let strength = source.strength();
        values.iter_mut().for_each(|v| *v *= strength);
        Ok(Some(values))
    }

    /// Stores the adjoint array of `organ` for `source`, normalized to unit
    /// strength.
    fn store_adjoint(
        &mut self,
        source: &SourceInstance,
        organ: Organ,
        values: &[f64],
    ) -> Result<(), DataStoreError> {
        let strength = source.strength();
        let normalized: Vec<f64> = values.iter().map(|v| v / strength).collect();
        self.store_array(&adjoint_key(&adjoint_entry(source), organ), &normalized)
    }
}

/// A store held entirely in memory.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    data: PatientData,
    arrays: HashMap<String, Vec<f64>>,
}

impl InMemoryStore {
    pub fn new(data: PatientData) -> Self {
        Self {
            data,
            arrays: HashMap::new(),
        }
    }

    pub fn with_array(mut self, key: impl Into<String>, values: Vec<f64>) -> Self {
        self.arrays.insert(key.into(), values);
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.arrays.contains_key(key)
    }
}

impl PatientDataStore for InMemoryStore {
    fn load_patient_data(&self) -> Result<PatientData, DataStoreError> {
        Ok(self.data.clone())
    }

    fn load_array(&self, key: &str) -> Result<Option<Vec<f64>>, DataStoreError> {
        Ok(self.arrays.get(key).cloned())
    }

    fn store_array(&mut self, key: &str, values: &[f64]) -> Result<(), DataStoreError> {
        self.arrays.insert(key.to_string(), values.to_vec());
        Ok(())
    }
}
