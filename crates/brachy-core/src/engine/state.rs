use super::config::PlannerType;
use crate::core::models::patient::Patient;

/// Summary of one optimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    pub planner: PlannerType,
    pub elapsed_secs: f64,
    /// Whether the final prostate coverage reached the goal.
    pub success: bool,
    pub coverage: f64,
    pub needles: usize,
    pub seeds: usize,
}

impl PlanOutcome {
    pub(crate) fn from_patient(
        planner: PlannerType,
        elapsed_secs: f64,
        patient: &Patient,
        coverage_goal: f64,
    ) -> Self {
        let coverage = patient.target_coverage();
        Self {
            planner,
            elapsed_secs,
            success: coverage >= coverage_goal,
            coverage,
            needles: patient.num_needles(),
            seeds: patient.num_seeds(),
        }
    }
}
