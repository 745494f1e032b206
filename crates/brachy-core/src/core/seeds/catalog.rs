use super::SeedError;
use super::builtin::BUILTIN_SEEDS;
use super::model::SeedModel;
use super::source::SourceInstance;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

type RawCatalogFile = HashMap<String, SeedModel>;

/// Registry of seed models keyed by identifier, e.g. `"Amersham6711Seed"`.
///
/// The catalog is the only way to obtain a [`SourceInstance`]: every instance of a
/// given type shares the same `Arc<SeedModel>`.
#[derive(Debug, Default, Clone)]
pub struct SeedCatalog {
    models: HashMap<String, Arc<SeedModel>>,
}

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid seed model in '{path}': {source}")]
    InvalidModel { path: String, source: SeedError },
}

impl SeedCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog holding every compiled-in seed model.
    pub fn with_builtin_models() -> Self {
        let models = BUILTIN_SEEDS
            .entries()
            .map(|(name, seed)| (name.to_string(), Arc::new(seed.to_model(name))))
            .collect();
        Self { models }
    }

    /// Loads additional seed models from a TOML file with one table per seed name.
    /// Models whose name already exists replace the previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogLoadError::Io`] or [`CatalogLoadError::Toml`] when the file
    /// cannot be read or parsed, and [`CatalogLoadError::InvalidModel`] when a table
    /// fails validation.
    pub fn load_models(&mut self, path: &Path) -> Result<usize, CatalogLoadError> {
        let path_str = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| CatalogLoadError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let raw: RawCatalogFile = toml::from_str(&content).map_err(|e| CatalogLoadError::Toml {
            path: path_str.clone(),
            source: e,
        })?;

        let count = raw.len();
        for (name, mut model) in raw {
            model.name = name.clone();
            model.validate().map_err(|e| CatalogLoadError::InvalidModel {
                path: path_str.clone(),
                source: e,
            })?;
            debug!(seed = %name, isotope = %model.isotope, "Registered seed model");
            self.models.insert(name, Arc::new(model));
        }
        Ok(count)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<SeedModel>> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Sorted seed identifiers.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Creates a source of type `name` at the given air-kerma strength.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::UnknownSeedType`] for an unregistered name and
    /// [`SeedError::InvalidStrength`] for a non-positive or non-finite strength.
    pub fn create_source(&self, name: &str, strength: f64) -> Result<SourceInstance, SeedError> {
        let model = self
            .get(name)
            .ok_or_else(|| SeedError::UnknownSeedType(name.to_string()))?;
        SourceInstance::new(Arc::clone(model), strength)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::seeds::model::Isotope;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CUSTOM_SEED_TOML: &str = r#"
[CustomSeed]
isotope = "Pd-103"
in-production = false
effective-length = 0.42
dose-rate-constant = 0.686

[CustomSeed.radial-dose]
radii = [0.1, 0.5, 1.0, 2.0]
values = [0.9, 1.05, 1.0, 0.5]
cunningham = [-0.5, -0.2, 0.1, 2.0, 0.5]

[CustomSeed.anisotropy]
angles = [0.0, 45.0, 90.0]
radii = [0.5, 1.0]
values = [[0.5, 0.9, 1.0], [0.6, 0.95, 1.0]]
"#;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn builtin_catalog_lists_all_compiled_models() {
        let catalog = SeedCatalog::with_builtin_models();
        assert_eq!(
            catalog.names(),
            ["Amersham6711Seed", "Best2301Seed", "Theragenics200Seed"]
        );
    }

    #[test]
    fn create_source_shares_the_model() {
        let catalog = SeedCatalog::with_builtin_models();
        let a = catalog.create_source("Best2301Seed", 0.4).unwrap();
        let b = catalog.create_source("Best2301Seed", 0.7).unwrap();
        assert!(std::ptr::eq(a.model(), b.model()));
        assert_eq!(a.strength(), 0.4);
        assert_eq!(a.name(), "Best2301Seed");
    }

    #[test]
    fn create_source_fails_for_unknown_name() {
        let catalog = SeedCatalog::with_builtin_models();
        let err = catalog.create_source("NoSuchSeed", 0.5).unwrap_err();
        assert_eq!(err, SeedError::UnknownSeedType("NoSuchSeed".to_string()));
    }

    #[test]
    fn create_source_fails_for_invalid_strength() {
        let catalog = SeedCatalog::with_builtin_models();
        assert!(matches!(
            catalog.create_source("Amersham6711Seed", -1.0),
            Err(SeedError::InvalidStrength { .. })
        ));
    }

    #[test]
    fn load_models_registers_seeds_from_toml() {
        let file = write_temp(CUSTOM_SEED_TOML);
        let mut catalog = SeedCatalog::new();
        let count = catalog.load_models(file.path()).unwrap();
        assert_eq!(count, 1);

        let model = catalog.get("CustomSeed").unwrap();
        assert_eq!(model.name, "CustomSeed");
        assert_eq!(model.isotope, Isotope::Palladium103);
        assert!(!model.in_production);
        assert!(catalog.create_source("CustomSeed", 1.0).is_ok());
    }

    #[test]
    fn load_models_reports_missing_file() {
        let mut catalog = SeedCatalog::new();
        let err = catalog
            .load_models(Path::new("/definitely/not/here.toml"))
            .unwrap_err();
        assert!(matches!(err, CatalogLoadError::Io { .. }));
    }

    #[test]
    fn load_models_reports_malformed_toml() {
        let file = write_temp("[Broken\nisotope = ");
        let mut catalog = SeedCatalog::new();
        assert!(matches!(
            catalog.load_models(file.path()),
            Err(CatalogLoadError::Toml { .. })
        ));
    }

    #[test]
    fn load_models_rejects_unsorted_tables() {
        let content = CUSTOM_SEED_TOML.replace(
            "radii = [0.1, 0.5, 1.0, 2.0]",
            "radii = [0.1, 1.0, 0.5, 2.0]",
        );
        let file = write_temp(&content);
        let mut catalog = SeedCatalog::new();
        assert!(matches!(
            catalog.load_models(file.path()),
            Err(CatalogLoadError::InvalidModel { .. })
        ));
    }
}
