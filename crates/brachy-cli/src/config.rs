mod defaults;

use crate::cli::PlanArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use brachyplan::engine::config as core_config;
use defaults::DefaultsConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const CENTIGRAY_PER_GRAY: f64 = 100.0;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialPlanningConfig {
    planner: Option<String>,
    #[serde(rename = "prescribed-dose-gy")]
    prescribed_dose_gy: Option<f64>,
    #[serde(rename = "coverage-goal")]
    coverage_goal: Option<f64>,
    #[serde(rename = "max-needles")]
    max_needles: Option<usize>,
    #[serde(rename = "needle-penalty")]
    needle_penalty: Option<bool>,
    #[serde(rename = "radius-floor")]
    radius_floor: Option<f64>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct PartialSeedSpec {
    name: String,
    strength: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialWeightsConfig {
    urethra: Option<f64>,
    rectum: Option<f64>,
    margin: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOutputConfig {
    plan: Option<PathBuf>,
    dvh: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    planning: Option<PartialPlanningConfig>,
    seeds: Option<Vec<PartialSeedSpec>>,
    weights: Option<PartialWeightsConfig>,
    output: Option<PartialOutputConfig>,
    #[serde(rename = "seed-catalog")]
    seed_catalog: Option<PathBuf>,
}

/// Fully resolved settings of one `plan` invocation.
#[derive(Debug)]
pub struct AppConfig {
    pub patient_path: PathBuf,
    pub seed_catalog: Option<PathBuf>,
    pub plan_output: Option<PathBuf>,
    pub dvh_output: Option<PathBuf>,
    pub core_config: core_config::PlanningConfig,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn merge_with_cli(mut self, args: &PlanArgs) -> Result<AppConfig> {
        self.apply_set_values(&args.set_values)?;
        let defaults = DefaultsConfig::default();

        let planning = self.planning.take().unwrap_or_default();
        let weights = self.weights.take().unwrap_or_default();
        let output = self.output.take().unwrap_or_default();

        let planner_name = args
            .planner
            .as_ref()
            .or(planning.planner.as_ref())
            .unwrap_or(&defaults.planner);
        let planner = core_config::PlannerType::from_str(planner_name)
            .map_err(|e| CliError::Argument(e.to_string()))?;

        let dose_gy = args
            .dose
            .or(planning.prescribed_dose_gy)
            .unwrap_or(defaults.prescribed_dose_gy);

        let seeds = Self::merge_seeds(&args.seeds, self.seeds.take(), &defaults)?;

        let core_weights = core_config::OrganWeights {
            urethra: args.urethra_weight.or(weights.urethra).unwrap_or(1.0),
            rectum: args.rectum_weight.or(weights.rectum).unwrap_or(1.0),
            margin: args.margin_weight.or(weights.margin).unwrap_or(1.0),
        };

        let mut builder = core_config::PlanningConfigBuilder::new()
            .planner(planner)
            .prescribed_dose(dose_gy * CENTIGRAY_PER_GRAY)
            .seeds(seeds)
            .weights(core_weights)
            .needle_penalty(args.needle_penalty || planning.needle_penalty.unwrap_or(false));
        if let Some(goal) = planning.coverage_goal {
            builder = builder.coverage_goal(goal);
        }
        if let Some(max_needles) = args.max_needles.or(planning.max_needles) {
            builder = builder.max_needles(max_needles);
        }
        if let Some(floor) = planning.radius_floor {
            builder = builder.radius_floor(floor);
        }
        let core_config = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        Ok(AppConfig {
            patient_path: args.patient.clone(),
            seed_catalog: args.seed_catalog.clone().or(self.seed_catalog),
            plan_output: args.plan_output.clone().or(output.plan),
            dvh_output: args.dvh_output.clone().or(output.dvh),
            core_config,
        })
    }

    /// Seeds given on the command line replace the file's list entirely.
    fn merge_seeds(
        cli_specs: &[String],
        file_specs: Option<Vec<PartialSeedSpec>>,
        defaults: &DefaultsConfig,
    ) -> Result<Vec<core_config::SeedSpec>> {
        if !cli_specs.is_empty() {
            return cli_specs
                .iter()
                .map(|spec| {
                    let (name, strength) = parser::parse_seed_spec(spec)
                        .map_err(|e| CliError::Argument(e.to_string()))?;
                    Ok(core_config::SeedSpec::new(
                        name,
                        strength.unwrap_or(defaults.seed_strength),
                    ))
                })
                .collect();
        }
        match file_specs {
            Some(specs) if !specs.is_empty() => Ok(specs
                .into_iter()
                .map(|p| {
                    core_config::SeedSpec::new(p.name, p.strength.unwrap_or(defaults.seed_strength))
                })
                .collect()),
            _ => Ok(vec![core_config::SeedSpec::new(
                defaults.seed_name.clone(),
                defaults.seed_strength,
            )]),
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            let float = || -> Result<f64> {
                value_str.parse().map_err(|_| {
                    CliError::Config(format!("Invalid float value for {}: {}", key, value_str))
                })
            };

            match key {
                "planning.planner" => {
                    self.planning.get_or_insert_with(Default::default).planner =
                        Some(value_str.to_string());
                }
                "planning.prescribed-dose-gy" => {
                    self.planning
                        .get_or_insert_with(Default::default)
                        .prescribed_dose_gy = Some(float()?);
                }
                "planning.coverage-goal" => {
                    self.planning
                        .get_or_insert_with(Default::default)
                        .coverage_goal = Some(float()?);
                }
                "planning.radius-floor" => {
                    self.planning
                        .get_or_insert_with(Default::default)
                        .radius_floor = Some(float()?);
                }
                "planning.max-needles" => {
                    self.planning
                        .get_or_insert_with(Default::default)
                        .max_needles = Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!(
                            "Invalid integer value for {}: {}",
                            key, value_str
                        ))
                    })?);
                }
                "planning.needle-penalty" => {
                    self.planning
                        .get_or_insert_with(Default::default)
                        .needle_penalty = Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!(
                            "Invalid boolean value for {}: {}",
                            key, value_str
                        ))
                    })?);
                }
                "weights.urethra" => {
                    self.weights.get_or_insert_with(Default::default).urethra = Some(float()?);
                }
                "weights.rectum" => {
                    self.weights.get_or_insert_with(Default::default).rectum = Some(float()?);
                }
                "weights.margin" => {
                    self.weights.get_or_insert_with(Default::default).margin = Some(float()?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
