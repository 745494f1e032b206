use super::config::PlanningConfig;
use super::progress::ProgressReporter;

/// Read-only inputs shared by every planning task of one run.
#[derive(Clone, Copy)]
pub struct PlanningContext<'a> {
    pub config: &'a PlanningConfig,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a> PlanningContext<'a> {
    pub fn new(config: &'a PlanningConfig, reporter: &'a ProgressReporter<'a>) -> Self {
        Self { config, reporter }
    }

    /// Prostate coverage fraction a plan must reach to count as successful.
    #[inline]
    pub fn coverage_goal(&self) -> f64 {
        self.config.coverage_goal
    }
}
