use crate::cli::SeedsArgs;
use crate::error::{CliError, Result};
use brachyplan::core::seeds::catalog::SeedCatalog;
use std::path::Path;
use tracing::info;

/// Builds the built-in catalog, extended by an optional TOML file of seed models.
pub fn load_catalog(extra: Option<&Path>) -> Result<SeedCatalog> {
    let mut catalog = SeedCatalog::with_builtin_models();
    if let Some(path) = extra {
        let count = catalog
            .load_models(path)
            .map_err(|e| CliError::FileParsing {
                path: path.to_path_buf(),
                source: e.into(),
            })?;
        info!(count, path = %path.display(), "Loaded additional seed models.");
    }
    Ok(catalog)
}

pub fn run(args: SeedsArgs) -> Result<()> {
    let catalog = load_catalog(args.seed_catalog.as_deref())?;

    println!("{:<24}{:<9}{:<12}{}", "Seed Type", "Isotope", "Lambda", "In Production");
    for name in catalog.names() {
        let Some(model) = catalog.get(name) else {
            continue;
        };
        println!(
            "{:<24}{:<9}{:<12.4}{}",
            name,
            model.isotope.to_string(),
            model.dose_rate_constant,
            if model.in_production { "yes" } else { "no" }
        );
    }
    Ok(())
}
