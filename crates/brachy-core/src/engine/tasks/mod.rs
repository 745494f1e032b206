//! Computational units of a planning run.
//!
//! [`adjoint`] and [`candidates`] prepare the ranked candidate list; [`iiem`],
//! [`dwdmm`] and [`scm`] are the interchangeable placement strategies. Every
//! strategy consumes the candidate list, mutates the patient only through
//! `insert_seed` and the snapshot operations, and reports a `PlanOutcome`.

pub mod adjoint;
pub mod candidates;
pub mod dwdmm;
pub mod iiem;
pub mod scm;

/// Index of the first minimum, or `None` for an empty sequence.
pub(crate) fn index_of_min<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in values.into_iter().enumerate() {
        match best {
            Some((_, current)) if !(value < current) => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}
