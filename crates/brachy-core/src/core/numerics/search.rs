use super::NumericsError;

/// Returns the index `i` such that `sequence[i] <= value <= sequence[i + 1]`.
///
/// The sequence must be sorted in ascending order without duplicates. A value equal
/// to the last element resolves to the final bracket (`len - 2`), so the returned
/// index always has a right-hand neighbour when the sequence holds two or more entries.
///
/// # Errors
///
/// Returns [`NumericsError::EmptySequence`] for an empty slice and
/// [`NumericsError::OutOfRange`] when `value` falls outside `[first, last]`.
pub fn binary_search(sequence: &[f64], value: f64) -> Result<usize, NumericsError> {
    let (Some(&first), Some(&last)) = (sequence.first(), sequence.last()) else {
        return Err(NumericsError::EmptySequence);
    };
    if !(value >= first && value <= last) {
        return Err(NumericsError::OutOfRange { value, first, last });
    }
    Ok(lower_bracket(sequence, value))
}

/// Bracket search without range validation; callers guarantee the preconditions
/// of [`binary_search`].
#[inline]
pub(crate) fn lower_bracket(sequence: &[f64], value: f64) -> usize {
    debug_assert!(!sequence.is_empty());

    let mut start = 0usize;
    let mut end = sequence.len() - 1;
    let mut distance = end - start + 1;

    while distance > 1 {
        let mid = start + distance / 2;
        if value >= sequence[mid] {
            start = mid;
        } else {
            end = mid;
        }
        distance = end - start;
    }

    if start + 1 == sequence.len() && start > 0 {
        start - 1
    } else {
        start
    }
}
