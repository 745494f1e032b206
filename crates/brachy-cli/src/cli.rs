use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "brachyplan - TG-43 dose evaluation and seed-placement optimization for permanent prostate brachytherapy.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE and per-iteration planner detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Optimize a seed-placement plan for a patient.
    Plan(PlanArgs),
    /// List the seed models available for planning.
    Seeds(SeedsArgs),
}

/// Arguments for the `plan` subcommand.
#[derive(Args, Debug)]
pub struct PlanArgs {
    // --- Core Arguments ---
    /// Path to the patient data file (TOML). Generated adjoint data is cached in it.
    #[arg(short = 'i', long, required = true, value_name = "PATH")]
    pub patient: PathBuf,

    /// Path to an optional planning configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Planning Overrides ---
    /// Placement strategy: 'iiem', 'dwdmm' or 'scm'.
    #[arg(short, long, value_name = "NAME")]
    pub planner: Option<String>,

    /// Seed type and air-kerma strength as NAME[:STRENGTH]. Can be used multiple times.
    /// Example: -s Amersham6711Seed:0.5
    #[arg(short, long = "seed", value_name = "NAME[:STRENGTH]")]
    pub seeds: Vec<String>,

    /// Prescribed dose in Gy.
    #[arg(short, long, value_name = "GY")]
    pub dose: Option<f64>,

    /// Importance weight of the urethra in candidate ranking.
    #[arg(long, value_name = "FLOAT")]
    pub urethra_weight: Option<f64>,

    /// Importance weight of the rectum in candidate ranking.
    #[arg(long, value_name = "FLOAT")]
    pub rectum_weight: Option<f64>,

    /// Importance weight of the margin in candidate ranking.
    #[arg(long, value_name = "FLOAT")]
    pub margin_weight: Option<f64>,

    /// Upper bound of the IIEM needle-count sweep.
    #[arg(long, value_name = "INT")]
    pub max_needles: Option<usize>,

    /// Penalize DWDMM picks that open a new needle.
    #[arg(long)]
    pub needle_penalty: bool,

    /// Additional seed model definitions (TOML).
    #[arg(long, value_name = "PATH")]
    pub seed_catalog: Option<PathBuf>,

    // --- Outputs ---
    /// Write the plan table to this file instead of standard output.
    #[arg(long, value_name = "PATH")]
    pub plan_output: Option<PathBuf>,

    /// Write the dose-volume histogram as CSV to this file.
    #[arg(long, value_name = "PATH")]
    pub dvh_output: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S planning.coverage-goal=0.95
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `seeds` subcommand.
#[derive(Args, Debug)]
pub struct SeedsArgs {
    /// Additional seed model definitions (TOML) to list alongside the built-in models.
    #[arg(long, value_name = "PATH")]
    pub seed_catalog: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_arguments_parse_repeated_seeds() {
        let cli = Cli::parse_from([
            "brachyplan",
            "plan",
            "-i",
            "patient.toml",
            "-s",
            "Amersham6711Seed:0.5",
            "-s",
            "Theragenics200Seed",
            "--planner",
            "scm",
            "-d",
            "145",
        ]);
        let Commands::Plan(args) = cli.command else {
            panic!("Expected 'plan' subcommand");
        };
        assert_eq!(args.seeds, ["Amersham6711Seed:0.5", "Theragenics200Seed"]);
        assert_eq!(args.planner.as_deref(), Some("scm"));
        assert_eq!(args.dose, Some(145.0));
        assert!(!args.needle_penalty);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["brachyplan", "-q", "-v", "seeds"]);
        assert!(result.is_err());
    }
}
