use crate::core::numerics::interpolation::lerp;
use crate::core::numerics::search::lower_bracket;
use nalgebra::Vector3;
use std::f64::consts::FRAC_PI_2;

pub const REFERENCE_RADIUS_CM: f64 = 1.0;
pub const REFERENCE_POLAR_ANGLE: f64 = FRAC_PI_2;

#[inline]
pub fn radius(dx: f64, dy: f64, dz: f64) -> f64 {
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Polar angle in `[0, π/2]` measured from the source axis (z). The source is
/// symmetric about its transverse plane, so only `|dz|` matters.
#[inline]
pub fn polar_angle(r: f64, dz: f64) -> f64 {
    if r == 0.0 {
        return FRAC_PI_2;
    }
    (dz.abs() / r).clamp(0.0, 1.0).acos()
}

/// Angle (radians) subtended by the two tips of a line source of length
/// `effective_length`, centered on the origin along z, seen from `(r, theta)`.
pub fn subtended_angle(r: f64, theta: f64, effective_length: f64) -> f64 {
    let point = Vector3::new(r * theta.sin(), 0.0, r * theta.cos());
    let half_length = 0.5 * effective_length;
    let to_upper_tip = Vector3::new(0.0, 0.0, half_length) - point;
    let to_lower_tip = Vector3::new(0.0, 0.0, -half_length) - point;
    to_upper_tip.angle(&to_lower_tip)
}

/// Line-source geometry function `G(r, θ)`.
///
/// On the source axis (`θ = 0`) this falls back to `1 / (r² − L²/4)`, which is
/// singular for `r ≤ L/2`; callers clamp the radius before evaluation.
pub fn geometry_function(r: f64, theta: f64, effective_length: f64) -> f64 {
    if theta == 0.0 {
        return 1.0 / (r * r - 0.25 * effective_length * effective_length);
    }
    let beta = subtended_angle(r, theta, effective_length);
    beta / (effective_length * r * theta.sin())
}

#[inline]
pub fn reference_geometry_function(effective_length: f64) -> f64 {
    geometry_function(REFERENCE_RADIUS_CM, REFERENCE_POLAR_ANGLE, effective_length)
}

/// Modified-exponential fit used beyond the last tabulated radius.
#[inline]
pub fn cunningham_fit(r: f64, coefficients: &[f64; 5]) -> f64 {
    let [c0, c1, c2, c3, c4] = *coefficients;
    let rising = (c0 * (r - c3)).exp();
    let falling = (c1 * (r - c3)).exp();
    c4 * (c2 + rising) / (c2 + rising + falling)
}

/// Radial dose function `g(r)`.
///
/// `radii` must be ascending with at least two entries and `values` the same length.
pub fn radial_dose_function(r: f64, radii: &[f64], values: &[f64], fit: &[f64; 5]) -> f64 {
    let first = radii[0];
    let last = radii[radii.len() - 1];

    if r < first {
        values[0]
    } else if r > last {
        cunningham_fit(r, fit)
    } else {
        let i = lower_bracket(radii, r);
        lerp(radii[i], radii[i + 1], r, values[i], values[i + 1])
    }
}

fn interpolate_row(row: &[f64], angles_deg: &[f64], angle_deg: f64, j: usize) -> f64 {
    lerp(angles_deg[j], angles_deg[j + 1], angle_deg, row[j], row[j + 1])
}

/// 2D anisotropy function `F(r, θ)`.
///
/// `rows[m][n]` holds the value at `radii[m]` and `angles_deg[n]`. The angle axis
/// is always interpolated; the radius axis clamps to the outermost rows.
pub fn anisotropy_function(
    r: f64,
    theta: f64,
    angles_deg: &[f64],
    radii: &[f64],
    rows: &[Vec<f64>],
) -> f64 {
    let first_angle = angles_deg[0];
    let last_angle = angles_deg[angles_deg.len() - 1];
    let angle_deg = theta.to_degrees().clamp(first_angle, last_angle);
    let j = lower_bracket(angles_deg, angle_deg);

    let last_radius_idx = radii.len() - 1;
    if r <= radii[0] {
        return interpolate_row(&rows[0], angles_deg, angle_deg, j);
    }
    if r >= radii[last_radius_idx] {
        return interpolate_row(&rows[last_radius_idx], angles_deg, angle_deg, j);
    }

    let m = lower_bracket(radii, r);
    let lower = interpolate_row(&rows[m], angles_deg, angle_deg, j);
    let upper = interpolate_row(&rows[m + 1], angles_deg, angle_deg, j);
    lerp(radii[m], radii[m + 1], r, lower, upper)
}
