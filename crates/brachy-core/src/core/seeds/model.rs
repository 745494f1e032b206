use super::SeedError;
use serde::Deserialize;
use std::fmt;

const HOURS_PER_DAY: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Isotope {
    #[serde(rename = "I-125", alias = "i125")]
    Iodine125,
    #[serde(rename = "Pd-103", alias = "pd103")]
    Palladium103,
}

impl Isotope {
    pub fn half_life_days(self) -> f64 {
        match self {
            Isotope::Iodine125 => 59.4,
            Isotope::Palladium103 => 16.991,
        }
    }

    /// Decay constant in 1/h.
    pub fn decay_constant_per_hour(self) -> f64 {
        std::f64::consts::LN_2 / (self.half_life_days() * HOURS_PER_DAY)
    }
}

impl fmt::Display for Isotope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Isotope::Iodine125 => write!(f, "I-125"),
            Isotope::Palladium103 => write!(f, "Pd-103"),
        }
    }
}

/// Tabulated radial dose function with its beyond-table extrapolation fit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RadialDoseTable {
    /// Radii in cm, ascending.
    pub radii: Vec<f64>,
    pub values: Vec<f64>,
    /// Coefficients `c0..c4` of the modified-exponential fit.
    pub cunningham: [f64; 5],
}

/// Tabulated 2D anisotropy function. `values[m][n]` is the entry at `radii[m]`
/// and `angles[n]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AnisotropyTable {
    /// Polar angles in degrees, ascending within `[0, 90]`.
    pub angles: Vec<f64>,
    /// Radii in cm, ascending.
    pub radii: Vec<f64>,
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SeedModel {
    #[serde(skip)]
    pub name: String,
    pub isotope: Isotope,
    #[serde(default = "default_in_production")]
    pub in_production: bool,
    /// Effective active length in cm.
    pub effective_length: f64,
    /// Dose-rate constant in cGy/(h·U).
    pub dose_rate_constant: f64,
    pub radial_dose: RadialDoseTable,
    pub anisotropy: AnisotropyTable,
}

fn default_in_production() -> bool {
    true
}

fn is_strictly_ascending(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite()) && values.windows(2).all(|w| w[0] < w[1])
}

impl SeedModel {
    pub fn validate(&self) -> Result<(), SeedError> {
        let malformed = |reason: &str| SeedError::MalformedTable {
            seed: self.name.clone(),
            reason: reason.to_string(),
        };

        if !(self.effective_length > 0.0 && self.effective_length.is_finite()) {
            return Err(malformed("effective length must be positive and finite"));
        }
        if !(self.dose_rate_constant > 0.0 && self.dose_rate_constant.is_finite()) {
            return Err(malformed("dose-rate constant must be positive and finite"));
        }

        let radial = &self.radial_dose;
        if radial.radii.len() < 2 {
            return Err(malformed("radial dose table needs at least two radii"));
        }
        if radial.radii.len() != radial.values.len() {
            return Err(malformed("radial dose radii and values differ in length"));
        }
        if !is_strictly_ascending(&radial.radii) || radial.radii[0] <= 0.0 {
            return Err(malformed("radial dose radii must be positive and ascending"));
        }
        if radial.cunningham.iter().any(|c| !c.is_finite()) {
            return Err(malformed("Cunningham coefficients must be finite"));
        }

        let aniso = &self.anisotropy;
        if aniso.angles.len() < 2 || aniso.radii.is_empty() {
            return Err(malformed(
                "anisotropy table needs at least two angles and one radius",
            ));
        }
        if !is_strictly_ascending(&aniso.angles)
            || aniso.angles[0] < 0.0
            || aniso.angles[aniso.angles.len() - 1] > 90.0
        {
            return Err(malformed(
                "anisotropy angles must be ascending within [0, 90] degrees",
            ));
        }
        if !is_strictly_ascending(&aniso.radii) {
            return Err(malformed("anisotropy radii must be ascending"));
        }
        if aniso.values.len() != aniso.radii.len()
            || aniso.values.iter().any(|row| row.len() != aniso.angles.len())
        {
            return Err(malformed(
                "anisotropy values must form a radii-by-angles grid",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_model() -> SeedModel {
        SeedModel {
            name: "TestSeed".to_string(),
            isotope: Isotope::Iodine125,
            in_production: true,
            effective_length: 0.3,
            dose_rate_constant: 1.0,
            radial_dose: RadialDoseTable {
                radii: vec![0.5, 1.0, 2.0],
                values: vec![1.1, 1.0, 0.8],
                cunningham: [1.0, 1.5, 0.1, 3.0, 1.0],
            },
            anisotropy: AnisotropyTable {
                angles: vec![0.0, 90.0],
                radii: vec![1.0],
                values: vec![vec![0.5, 1.0]],
            },
        }
    }

    #[test]
    fn iodine_decay_constant_matches_half_life() {
        let lambda = Isotope::Iodine125.decay_constant_per_hour();
        assert!((lambda * 59.4 * 24.0 - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn palladium_decays_faster_than_iodine() {
        assert!(
            Isotope::Palladium103.decay_constant_per_hour()
                > Isotope::Iodine125.decay_constant_per_hour()
        );
    }

    #[test]
    fn well_formed_model_validates() {
        assert_eq!(minimal_model().validate(), Ok(()));
    }

    #[test]
    fn mismatched_radial_table_is_rejected() {
        let mut model = minimal_model();
        model.radial_dose.values.pop();
        assert!(matches!(
            model.validate(),
            Err(SeedError::MalformedTable { .. })
        ));
    }

    #[test]
    fn unsorted_anisotropy_angles_are_rejected() {
        let mut model = minimal_model();
        model.anisotropy.angles = vec![90.0, 0.0];
        assert!(matches!(
            model.validate(),
            Err(SeedError::MalformedTable { .. })
        ));
    }

    #[test]
    fn ragged_anisotropy_grid_is_rejected() {
        let mut model = minimal_model();
        model.anisotropy.values[0].push(1.0);
        assert!(model.validate().is_err());
    }

    #[test]
    fn non_positive_length_is_rejected() {
        let mut model = minimal_model();
        model.effective_length = 0.0;
        assert!(model.validate().is_err());
    }
}
