use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_COVERAGE_GOAL: f64 = 0.98;
pub const DEFAULT_MAX_NEEDLES: usize = 19;
pub const DEFAULT_RADIUS_FLOOR_CM: f64 = 0.04;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

/// Seed placement strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlannerType {
    /// Isodose-exclusion sweep.
    Iiem,
    /// Dynamic-weight greedy.
    Dwdmm,
    /// Set-cover greedy.
    Scm,
}

impl PlannerType {
    pub const ALL: [PlannerType; 3] = [PlannerType::Iiem, PlannerType::Dwdmm, PlannerType::Scm];

    pub fn as_str(self) -> &'static str {
        match self {
            PlannerType::Iiem => "iiem",
            PlannerType::Dwdmm => "dwdmm",
            PlannerType::Scm => "scm",
        }
    }
}

impl fmt::Display for PlannerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlannerType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlannerType::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::InvalidParameter {
                parameter: "planner",
                reason: format!("unknown planner '{}', expected one of iiem, dwdmm, scm", s),
            })
    }
}

/// A seed type and the air-kerma strength (U) to plan with.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedSpec {
    pub name: String,
    pub strength: f64,
}

impl SeedSpec {
    pub fn new(name: impl Into<String>, strength: f64) -> Self {
        Self {
            name: name.into(),
            strength,
        }
    }
}

/// Importance weights of the structures penalized by candidate ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrganWeights {
    pub urethra: f64,
    pub margin: f64,
    pub rectum: f64,
}

impl Default for OrganWeights {
    fn default() -> Self {
        Self {
            urethra: 1.0,
            margin: 1.0,
            rectum: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanningConfig {
    pub planner: PlannerType,
    /// Prescribed dose in cGy.
    pub prescribed_dose: f64,
    pub seeds: Vec<SeedSpec>,
    pub weights: OrganWeights,
    /// Fraction of prostate voxels that must reach the prescribed dose.
    pub coverage_goal: f64,
    /// Upper bound of the IIEM needle-count sweep.
    pub max_needles: usize,
    /// Enables the DWDMM needle-reuse penalty.
    pub needle_penalty: bool,
    /// Minimum source-to-voxel distance used by dose kernels, in cm.
    pub radius_floor: f64,
}

#[derive(Default)]
pub struct PlanningConfigBuilder {
    planner: Option<PlannerType>,
    prescribed_dose: Option<f64>,
    seeds: Vec<SeedSpec>,
    weights: Option<OrganWeights>,
    coverage_goal: Option<f64>,
    max_needles: Option<usize>,
    needle_penalty: Option<bool>,
    radius_floor: Option<f64>,
}

impl PlanningConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn planner(mut self, planner: PlannerType) -> Self {
        self.planner = Some(planner);
        self
    }
    pub fn prescribed_dose(mut self, dose_cgy: f64) -> Self {
        self.prescribed_dose = Some(dose_cgy);
        self
    }
    pub fn seed(mut self, name: impl Into<String>, strength: f64) -> Self {
        self.seeds.push(SeedSpec::new(name, strength));
        self
    }
    pub fn seeds(mut self, seeds: Vec<SeedSpec>) -> Self {
        self.seeds = seeds;
        self
    }
    pub fn weights(mut self, weights: OrganWeights) -> Self {
        self.weights = Some(weights);
        self
    }
    pub fn coverage_goal(mut self, goal: f64) -> Self {
        self.coverage_goal = Some(goal);
        self
    }
    pub fn max_needles(mut self, n: usize) -> Self {
        self.max_needles = Some(n);
        self
    }
    pub fn needle_penalty(mut self, enabled: bool) -> Self {
        self.needle_penalty = Some(enabled);
        self
    }
    pub fn radius_floor(mut self, floor_cm: f64) -> Self {
        self.radius_floor = Some(floor_cm);
        self
    }

    pub fn build(self) -> Result<PlanningConfig, ConfigError> {
        let planner = self
            .planner
            .ok_or(ConfigError::MissingParameter("planner"))?;
        let prescribed_dose = self
            .prescribed_dose
            .ok_or(ConfigError::MissingParameter("prescribed_dose"))?;
        if self.seeds.is_empty() {
            return Err(ConfigError::MissingParameter("seeds"));
        }
        let weights = self.weights.unwrap_or_default();
        let coverage_goal = self.coverage_goal.unwrap_or(DEFAULT_COVERAGE_GOAL);
        let max_needles = self.max_needles.unwrap_or(DEFAULT_MAX_NEEDLES);
        let radius_floor = self.radius_floor.unwrap_or(DEFAULT_RADIUS_FLOOR_CM);

        ensure_positive("prescribed_dose", prescribed_dose)?;
        ensure_positive("weights.urethra", weights.urethra)?;
        ensure_positive("weights.margin", weights.margin)?;
        ensure_positive("weights.rectum", weights.rectum)?;
        ensure_positive("radius_floor", radius_floor)?;
        if !(coverage_goal > 0.0 && coverage_goal <= 1.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "coverage_goal",
                reason: format!("{} is not within (0, 1]", coverage_goal),
            });
        }
        if max_needles == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "max_needles",
                reason: "must be at least 1".to_string(),
            });
        }
        for seed in &self.seeds {
            if seed.name.trim().is_empty() {
                return Err(ConfigError::InvalidParameter {
                    parameter: "seeds",
                    reason: "seed name is empty".to_string(),
                });
            }
            ensure_positive("seeds.strength", seed.strength)?;
        }

        Ok(PlanningConfig {
            planner,
            prescribed_dose,
            seeds: self.seeds,
            weights,
            coverage_goal,
            max_needles,
            needle_penalty: self.needle_penalty.unwrap_or(false),
            radius_floor,
        })
    }
}

fn ensure_positive(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            parameter,
            reason: format!("{} must be positive and finite", value),
        })
    }
}
