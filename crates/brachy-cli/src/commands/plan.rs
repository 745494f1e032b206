use super::seeds::load_catalog;
use crate::cli::PlanArgs;
use crate::config::PartialRunConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use brachyplan::{
    core::io::{report, toml_file::TomlPatientFile},
    core::models::patient::Patient,
    engine::{progress::ProgressReporter, state::PlanOutcome},
    workflows,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

pub fn run(args: PlanArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialRunConfig::from_file(path)?,
        None => PartialRunConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    let catalog = load_catalog(config.seed_catalog.as_deref())?;

    info!("Opening patient data file {:?}", &config.patient_path);
    let mut store =
        TomlPatientFile::open(&config.patient_path).map_err(|e| CliError::FileParsing {
            path: config.patient_path.clone(),
            source: e.into(),
        })?;

    let progress_handler = CliProgressHandler::new(config.core_config.planner);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Starting {} treatment planning...",
        config.core_config.planner.as_str().to_uppercase()
    );
    let result = workflows::plan::run(&mut store, &catalog, &config.core_config, &reporter)?;

    print_summary(&result.outcome);
    if !result.outcome.success {
        warn!("The plan does not reach the coverage goal.");
    }

    match &config.plan_output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            report::write_treatment_plan(&result.patient, &mut writer)?;
            writer.flush()?;
            println!("✓ Treatment plan written to: {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle)?;
            report::write_treatment_plan(&result.patient, &mut handle)?;
        }
    }

    if let Some(path) = &config.dvh_output {
        write_dvh_file(&result.patient, path)?;
        println!("✓ Dose-volume histogram written to: {}", path.display());
    }

    Ok(())
}

fn write_dvh_file(patient: &Patient, path: &Path) -> Result<()> {
    let rows = report::dose_volume_histogram(patient);
    let file = File::create(path)?;
    report::write_dvh(&rows, BufWriter::new(file)).map_err(|e| CliError::Other(e.into()))
}

fn print_summary(outcome: &PlanOutcome) {
    println!();
    println!("========== Treatment Plan Summary ==========");
    println!("Planner:                    {}", outcome.planner.as_str().to_uppercase());
    println!("Plan Optimization Time (s): {:.3}", outcome.elapsed_secs);
    println!(
        "Successful Optimization:    {}",
        if outcome.success { "Yes" } else { "No" }
    );
    println!("Target Coverage (%):        {:.2}", outcome.coverage * 100.0);
    println!("Needles Chosen:             {}", outcome.needles);
    println!("Seeds Chosen:               {}", outcome.seeds);
}
