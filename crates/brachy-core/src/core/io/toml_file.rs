use super::DataStoreError;
use super::store::{PatientData, PatientDataStore, parse_adjoint_key};
use crate::core::models::mesh::MeshGeometry;
use crate::core::models::tissue::TissueMasks;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const DEFAULT_ELEMENT_DIMENSIONS: [f64; 3] = [0.1, 0.1, 0.5];

fn default_element_dimensions() -> [f64; 3] {
    DEFAULT_ELEMENT_DIMENSIONS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PatientDocument {
    needle_template: Vec<u8>,
    mesh: MeshSection,
    organ_masks: OrganMasksSection,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    adjoint_data: BTreeMap<String, BTreeMap<String, Vec<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct MeshSection {
    dimensions: [usize; 3],
    #[serde(default = "default_element_dimensions")]
    element_dimensions: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct OrganMasksSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    prostate: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    urethra: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    margin: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rectum: Option<Vec<u8>>,
}

/// A patient data store backed by a single TOML document.
///
/// ```toml
/// needle-template = [0, 1, 1, 0]
///
/// [mesh]
/// dimensions = [2, 2, 3]
/// element-dimensions = [0.1, 0.1, 0.5]
///
/// [organ-masks]
/// prostate = [0, 1, 0, 0, ...]
/// urethra = [...]
///
/// [adjoint-data.Amersham6711Seed]
/// prostate = [...]
/// ```
///
/// Organ masks are 0/1 arrays in flat mesh order (x fastest). A missing urethra,
/// margin or rectum mask is treated as empty. Cached adjoint arrays are written
/// back to the file as soon as they are stored.
#[derive(Debug, Clone)]
pub struct TomlPatientFile {
    path: PathBuf,
    document: PatientDocument,
}

impl TomlPatientFile {
    /// Reads and parses a patient file.
    ///
    /// # Errors
    ///
    /// Returns [`DataStoreError::Io`] or [`DataStoreError::Toml`] if the file cannot
    /// be read or parsed.
    pub fn open(path: &Path) -> Result<Self, DataStoreError> {
        let path_str = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| DataStoreError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let document: PatientDocument =
            toml::from_str(&content).map_err(|e| DataStoreError::Toml {
                path: path_str,
                source: e,
            })?;
        debug!(path = %path.display(), "Opened patient file");
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    /// Writes `data` to a new patient file at `path`, replacing any existing file.
    pub fn create(path: &Path, data: &PatientData) -> Result<Self, DataStoreError> {
        let to_flags =
            |mask: &[bool]| -> Option<Vec<u8>> { Some(mask.iter().map(|&v| u8::from(v)).collect()) };
        let document = PatientDocument {
            needle_template: data.needle_template.iter().map(|&v| u8::from(v)).collect(),
            mesh: MeshSection {
                dimensions: data.mesh.dimensions(),
                element_dimensions: data.mesh.element_dimensions(),
            },
            organ_masks: OrganMasksSection {
                prostate: to_flags(&data.masks.prostate),
                urethra: to_flags(&data.masks.urethra),
                margin: to_flags(&data.masks.margin),
                rectum: to_flags(&data.masks.rectum),
            },
            adjoint_data: BTreeMap::new(),
        };
        let file = Self {
            path: path.to_path_buf(),
            document,
        };
        file.save()?;
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes the document back to its path.
    pub fn save(&self) -> Result<(), DataStoreError> {
        let path_str = self.path.to_string_lossy().to_string();
        let content =
            toml::to_string(&self.document).map_err(|e| DataStoreError::Serialize {
                path: path_str.clone(),
                source: e,
            })?;
        std::fs::write(&self.path, content).map_err(|e| DataStoreError::Io {
            path: path_str,
            source: e,
        })
    }
}

fn to_mask(
    key: &str,
    flags: Option<&Vec<u8>>,
    expected: usize,
    required: bool,
) -> Result<Vec<bool>, DataStoreError> {
    let Some(flags) = flags else {
        if required {
            return Err(DataStoreError::MissingKey(key.to_string()));
        }
        warn!(key, "Mask not present in patient file; treating it as empty");
        return Ok(vec![false; expected]);
    };
    if flags.len() != expected {
        return Err(DataStoreError::ShapeMismatch {
            key: key.to_string(),
            expected,
            actual: flags.len(),
        });
    }
    flags
        .iter()
        .map(|&flag| match flag {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DataStoreError::InvalidValue {
                key: key.to_string(),
                reason: format!("expected 0 or 1, found {}", other),
            }),
        })
        .collect()
}

impl PatientDataStore for TomlPatientFile {
    fn load_patient_data(&self) -> Result<PatientData, DataStoreError> {
        let doc = &self.document;
        let mesh = MeshGeometry::new(doc.mesh.dimensions, doc.mesh.element_dimensions)?;
        let voxels = mesh.voxel_count();
        let masks = &doc.organ_masks;

        let masks = TissueMasks {
            prostate: to_mask("organ-masks.prostate", masks.prostate.as_ref(), voxels, true)?,
            urethra: to_mask("organ-masks.urethra", masks.urethra.as_ref(), voxels, false)?,
            margin: to_mask("organ-masks.margin", masks.margin.as_ref(), voxels, false)?,
            rectum: to_mask("organ-masks.rectum", masks.rectum.as_ref(), voxels, false)?,
        };
        let needle_template = to_mask(
            "needle-template",
            Some(&doc.needle_template),
            mesh.column_count(),
            true,
        )?;

        Ok(PatientData {
            mesh,
            masks,
            needle_template,
        })
    }

    fn load_array(&self, key: &str) -> Result<Option<Vec<f64>>, DataStoreError> {
        Ok(parse_adjoint_key(key).and_then(|(seed, organ)| {
            self.document
                .adjoint_data
                .get(seed)
                .and_then(|organs| organs.get(organ.as_str()))
                .cloned()
        }))
    }

    fn store_array(&mut self, key: &str, values: &[f64]) -> Result<(), DataStoreError> {
        let (seed, organ) =
            parse_adjoint_key(key).ok_or_else(|| DataStoreError::UnsupportedKey(key.to_string()))?;
        self.document
            .adjoint_data
            .entry(seed.to_string())
            .or_default()
            .insert(organ.to_string(), values.to_vec());
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::store::adjoint_key;
    use crate::core::models::fixtures;
    use crate::core::models::tissue::Organ;
    use tempfile::tempdir;

    const SMALL_PATIENT: &str = r#"
needle-template = [0, 1, 0, 0]

[mesh]
dimensions = [2, 2, 2]

[organ-masks]
prostate = [0, 1, 0, 0, 0, 1, 0, 0]
rectum = [0, 0, 1, 1, 0, 0, 0, 0]
"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn open_reads_masks_and_applies_default_voxel_size() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "patient.toml", SMALL_PATIENT);
        let data = TomlPatientFile::open(&path).unwrap().load_patient_data().unwrap();

        assert_eq!(data.mesh.dimensions(), [2, 2, 2]);
        assert_eq!(data.mesh.element_dimensions(), DEFAULT_ELEMENT_DIMENSIONS);
        assert_eq!(data.masks.count(Organ::Prostate), 2);
        assert_eq!(data.masks.count(Organ::Rectum), 2);
        assert_eq!(data.masks.count(Organ::Urethra), 0);
        assert_eq!(data.needle_template, [false, true, false, false]);
    }

    #[test]
    fn missing_prostate_mask_is_reported() {
        let dir = tempdir().unwrap();
        let content = SMALL_PATIENT.replace("prostate = [0, 1, 0, 0, 0, 1, 0, 0]\n", "");
        let path = write(dir.path(), "patient.toml", &content);
        let err = TomlPatientFile::open(&path).unwrap().load_patient_data().unwrap_err();
        assert!(matches!(err, DataStoreError::MissingKey(ref key) if key == "organ-masks.prostate"));
    }

    #[test]
    fn mask_of_wrong_length_is_reported() {
        let dir = tempdir().unwrap();
        let content = SMALL_PATIENT.replace("rectum = [0, 0, 1, 1, 0, 0, 0, 0]", "rectum = [0, 1]");
        let path = write(dir.path(), "patient.toml", &content);
        let err = TomlPatientFile::open(&path).unwrap().load_patient_data().unwrap_err();
        assert!(matches!(err, DataStoreError::ShapeMismatch { expected: 8, actual: 2, .. }));
    }

    #[test]
    fn non_binary_mask_value_is_reported() {
        let dir = tempdir().unwrap();
        let content = SMALL_PATIENT.replace("needle-template = [0, 1, 0, 0]", "needle-template = [0, 2, 0, 0]");
        let path = write(dir.path(), "patient.toml", &content);
        let err = TomlPatientFile::open(&path).unwrap().load_patient_data().unwrap_err();
        assert!(matches!(err, DataStoreError::InvalidValue { .. }));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let dir = tempdir().unwrap();
        let content = format!("{}\n[extra]\nvalue = 1\n", SMALL_PATIENT);
        let path = write(dir.path(), "patient.toml", &content);
        assert!(matches!(
            TomlPatientFile::open(&path),
            Err(DataStoreError::Toml { .. })
        ));
    }

    #[test]
    fn stored_adjoint_data_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "patient.toml", SMALL_PATIENT);
        let key = adjoint_key("Amersham6711Seed", Organ::Urethra);
        let values = vec![0.5, 1.5, 0.0, 0.0, 2.0, 0.0, 0.0, 0.25];

        let mut file = TomlPatientFile::open(&path).unwrap();
        file.store_array(&key, &values).unwrap();

        let reopened = TomlPatientFile::open(&path).unwrap();
        assert_eq!(reopened.load_array(&key).unwrap(), Some(values));
        assert_eq!(
            reopened
                .load_array(&adjoint_key("Amersham6711Seed", Organ::Rectum))
                .unwrap(),
            None
        );
    }

    #[test]
    fn store_array_rejects_non_adjoint_keys() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "patient.toml", SMALL_PATIENT);
        let mut file = TomlPatientFile::open(&path).unwrap();
        assert!(matches!(
            file.store_array("/mesh/dimensions", &[1.0]),
            Err(DataStoreError::UnsupportedKey(_))
        ));
    }

    #[test]
    fn create_writes_a_readable_patient_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("block.toml");
        let (mesh, masks, needle_template) = fixtures::block_anatomy();
        let data = PatientData {
            mesh,
            masks,
            needle_template,
        };

        TomlPatientFile::create(&path, &data).unwrap();
        let loaded = TomlPatientFile::open(&path).unwrap().load_patient_data().unwrap();
        assert_eq!(loaded, data);
    }
}
