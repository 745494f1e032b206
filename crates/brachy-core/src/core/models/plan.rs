use super::position::SeedPosition;
use std::collections::HashSet;

/// Ordered sequence of inserted seeds plus the needle columns they occupy.
#[derive(Debug, Clone, Default)]
pub struct TreatmentPlan {
    seeds: Vec<SeedPosition>,
    needles: HashSet<usize>,
    occupied: HashSet<[usize; 3]>,
}

impl TreatmentPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, position: SeedPosition, column: usize) {
        self.needles.insert(column);
        self.occupied.insert(position.indices());
        self.seeds.push(position);
    }

    pub fn seeds(&self) -> &[SeedPosition] {
        &self.seeds
    }

    pub fn num_seeds(&self) -> usize {
        self.seeds.len()
    }

    pub fn num_needles(&self) -> usize {
        self.needles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn uses_needle(&self, column: usize) -> bool {
        self.needles.contains(&column)
    }

    pub fn is_occupied(&self, indices: [usize; 3]) -> bool {
        self.occupied.contains(&indices)
    }
}

/// A checkpoint of the mutable part of a patient: plan, needle set and dose.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub(crate) plan: TreatmentPlan,
    pub(crate) dose: Vec<f64>,
}

impl Snapshot {
    pub fn plan(&self) -> &TreatmentPlan {
        &self.plan
    }

    pub fn dose(&self) -> &[f64] {
        &self.dose
    }
}
