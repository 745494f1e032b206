use super::SeedError;
use super::model::SeedModel;
use crate::core::dosimetry::functions::{
    anisotropy_function, geometry_function, polar_angle, radial_dose_function, radius,
    reference_geometry_function,
};
use nalgebra::{Rotation3, Vector3};
use std::sync::Arc;

/// A seed model bound to a calibrated air-kerma strength.
///
/// The source axis lies along z unless an orientation is given, in which case the
/// axis is tilted by that angle (radians) in the x-z plane.
#[derive(Debug, Clone)]
pub struct SourceInstance {
    model: Arc<SeedModel>,
    strength: f64,
    orientation: Option<f64>,
    reference_geometry: f64,
    decay_constant: f64,
}

impl SourceInstance {
    pub fn new(model: Arc<SeedModel>, strength: f64) -> Result<Self, SeedError> {
        Self::with_orientation(model, strength, None)
    }

    pub fn with_orientation(
        model: Arc<SeedModel>,
        strength: f64,
        orientation: Option<f64>,
    ) -> Result<Self, SeedError> {
        if !(strength > 0.0 && strength.is_finite()) {
            return Err(SeedError::InvalidStrength {
                seed: model.name.clone(),
                strength,
            });
        }
        if let Some(angle) = orientation.filter(|a| !a.is_finite()) {
            return Err(SeedError::MalformedTable {
                seed: model.name.clone(),
                reason: format!("orientation angle {} is not finite", angle),
            });
        }

        let reference_geometry = reference_geometry_function(model.effective_length);
        let decay_constant = model.isotope.decay_constant_per_hour();
        Ok(Self {
            model,
            strength,
            orientation,
            reference_geometry,
            decay_constant,
        })
    }

    pub fn name(&self) -> &str {
        &self.model.name
    }

    pub fn model(&self) -> &SeedModel {
        &self.model
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn orientation(&self) -> Option<f64> {
        self.orientation
    }

    fn to_source_frame(&self, dx: f64, dy: f64, dz: f64) -> Vector3<f64> {
        let offset = Vector3::new(dx, dy, dz);
        match self.orientation {
            Some(angle) if angle != 0.0 => {
                Rotation3::from_axis_angle(&Vector3::y_axis(), -angle) * offset
            }
            _ => offset,
        }
    }

    /// Dose rate in cGy/h at the displacement `(dx, dy, dz)` (cm) from the source center.
    pub fn dose_rate(&self, dx: f64, dy: f64, dz: f64) -> f64 {
        self.local_dose_rate(&self.to_source_frame(dx, dy, dz))
    }

    /// Dose in cGy delivered over the full decay of the source.
    pub fn total_dose(&self, dx: f64, dy: f64, dz: f64) -> f64 {
        self.dose_rate(dx, dy, dz) / self.decay_constant
    }

    /// Total dose with the evaluation point moved out of the singular region.
    ///
    /// Points closer than `radius_floor` are evaluated at the floor on the transverse
    /// axis. Points on the source axis within half the active length are evaluated
    /// on the transverse axis at the same radius.
    pub fn clamped_total_dose(&self, dx: f64, dy: f64, dz: f64, radius_floor: f64) -> f64 {
        let local = self.to_source_frame(dx, dy, dz);
        let r = radius(local.x, local.y, local.z);
        let inside_active_length =
            polar_angle(r, local.z) == 0.0 && r <= 0.5 * self.model.effective_length;

        let point = if r < radius_floor {
            Vector3::new(radius_floor, 0.0, 0.0)
        } else if inside_active_length {
            Vector3::new(r, 0.0, 0.0)
        } else {
            local
        };
        self.local_dose_rate(&point) / self.decay_constant
    }

    fn local_dose_rate(&self, local: &Vector3<f64>) -> f64 {
        let r = radius(local.x, local.y, local.z);
        let theta = polar_angle(r, local.z);

        let model = &*self.model;
        let geometry = geometry_function(r, theta, model.effective_length);
        let radial = radial_dose_function(
            r,
            &model.radial_dose.radii,
            &model.radial_dose.values,
            &model.radial_dose.cunningham,
        );
        let anisotropy = anisotropy_function(
            r,
            theta,
            &model.anisotropy.angles,
            &model.anisotropy.radii,
            &model.anisotropy.values,
        );

        self.strength * model.dose_rate_constant * geometry * radial * anisotropy
            / self.reference_geometry
    }
}
