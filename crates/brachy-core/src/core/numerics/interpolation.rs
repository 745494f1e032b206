use super::NumericsError;

fn check_interval(x0: f64, x1: f64, x: f64) -> Result<(), NumericsError> {
    if !(x0 < x1) {
        return Err(NumericsError::DegenerateInterval { x0, x1 });
    }
    if !(x >= x0 && x <= x1) {
        return Err(NumericsError::OutsideInterval { x, x0, x1 });
    }
    Ok(())
}

fn check_positive(axis: &'static str, values: &[f64]) -> Result<(), NumericsError> {
    match values.iter().find(|&&v| !(v > 0.0)) {
        Some(&value) => Err(NumericsError::NonPositiveLogValue { axis, value }),
        None => Ok(()),
    }
}

#[inline]
pub(crate) fn lerp(x0: f64, x1: f64, x: f64, y0: f64, y1: f64) -> f64 {
    y0 + (y1 - y0) / (x1 - x0) * (x - x0)
}

/// Linear blending on both axes.
pub fn lin_lin(x0: f64, x1: f64, x: f64, y0: f64, y1: f64) -> Result<f64, NumericsError> {
    check_interval(x0, x1, x)?;
    Ok(lerp(x0, x1, x, y0, y1))
}

/// Logarithmic dependent axis, linear independent axis.
pub fn log_lin(x0: f64, x1: f64, x: f64, y0: f64, y1: f64) -> Result<f64, NumericsError> {
    check_interval(x0, x1, x)?;
    check_positive("dependent", &[y0, y1])?;
    Ok(y0 * (y1 / y0).powf((x - x0) / (x1 - x0)))
}

/// Linear dependent axis, logarithmic independent axis.
pub fn lin_log(x0: f64, x1: f64, x: f64, y0: f64, y1: f64) -> Result<f64, NumericsError> {
    check_interval(x0, x1, x)?;
    check_positive("independent", &[x0, x1, x])?;
    Ok(y0 + (y1 - y0) * (x / x0).ln() / (x1 / x0).ln())
}

/// Logarithmic blending on both axes.
pub fn log_log(x0: f64, x1: f64, x: f64, y0: f64, y1: f64) -> Result<f64, NumericsError> {
    check_interval(x0, x1, x)?;
    check_positive("independent", &[x0, x1, x])?;
    check_positive("dependent", &[y0, y1])?;
    Ok(y0 * (y1 / y0).powf((x / x0).ln() / (x1 / x0).ln()))
}
