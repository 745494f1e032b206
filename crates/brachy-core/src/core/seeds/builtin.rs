use super::model::{AnisotropyTable, Isotope, RadialDoseTable, SeedModel};
use phf::{Map, phf_map};

/// Compiled-in TG-43 parameters for one seed model.
#[derive(Debug)]
pub struct BuiltinSeed {
    pub isotope: Isotope,
    pub in_production: bool,
    pub effective_length: f64,
    pub dose_rate_constant: f64,
    pub radial_radii: &'static [f64],
    pub radial_values: &'static [f64],
    pub cunningham: [f64; 5],
    pub anisotropy_angles: &'static [f64],
    pub anisotropy_radii: &'static [f64],
    pub anisotropy_values: &'static [&'static [f64]],
}

impl BuiltinSeed {
    pub fn to_model(&self, name: &str) -> SeedModel {
        SeedModel {
            name: name.to_string(),
            isotope: self.isotope,
            in_production: self.in_production,
            effective_length: self.effective_length,
            dose_rate_constant: self.dose_rate_constant,
            radial_dose: RadialDoseTable {
                radii: self.radial_radii.to_vec(),
                values: self.radial_values.to_vec(),
                cunningham: self.cunningham,
            },
            anisotropy: AnisotropyTable {
                angles: self.anisotropy_angles.to_vec(),
                radii: self.anisotropy_radii.to_vec(),
                values: self
                    .anisotropy_values
                    .iter()
                    .map(|row| row.to_vec())
                    .collect(),
            },
        }
    }
}

const STANDARD_RADII: [f64; 16] = [
    0.1, 0.15, 0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0,
];

const STANDARD_ANGLES: [f64; 11] = [
    0.0, 5.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0,
];

static AMERSHAM_6711: BuiltinSeed = BuiltinSeed {
    isotope: Isotope::Iodine125,
    in_production: true,
    effective_length: 0.30,
    dose_rate_constant: 0.965,
    radial_radii: &STANDARD_RADII,
    radial_values: &[
        1.055, 1.078, 1.082, 1.071, 1.042, 1.000, 0.908, 0.814, 0.632, 0.496, 0.364, 0.270, 0.199,
        0.148, 0.109, 0.0803,
    ],
    cunningham: [
        1.46765182623,
        1.87106159031,
        0.0942126722129,
        3.31408710528,
        1.10557239977,
    ],
    anisotropy_angles: &STANDARD_ANGLES,
    anisotropy_radii: &[0.5, 1.0, 2.0, 3.0, 4.0, 5.0],
    anisotropy_values: &[
        &[0.333, 0.400, 0.519, 0.716, 0.846, 0.926, 0.972, 0.991, 0.996, 1.000, 1.000],
        &[0.370, 0.429, 0.537, 0.705, 0.834, 0.925, 0.972, 0.991, 0.996, 1.000, 1.000],
        &[0.442, 0.497, 0.580, 0.727, 0.842, 0.926, 0.970, 0.987, 0.996, 1.000, 1.000],
        &[0.488, 0.535, 0.609, 0.743, 0.846, 0.926, 0.969, 0.987, 0.995, 0.999, 1.000],
        &[0.520, 0.561, 0.630, 0.752, 0.848, 0.928, 0.969, 0.987, 0.995, 0.999, 1.000],
        &[0.550, 0.587, 0.645, 0.760, 0.852, 0.928, 0.969, 0.987, 0.995, 0.999, 1.000],
    ],
};

static BEST_2301: BuiltinSeed = BuiltinSeed {
    isotope: Isotope::Iodine125,
    in_production: true,
    effective_length: 0.40,
    dose_rate_constant: 1.018,
    radial_radii: &STANDARD_RADII,
    radial_values: &[
        1.033, 1.029, 1.027, 1.028, 1.030, 1.000, 0.938, 0.866, 0.707, 0.555, 0.427, 0.320, 0.248,
        0.187, 0.142, 0.103,
    ],
    cunningham: [
        1.06522357779,
        1.42597081747,
        0.245016744334,
        3.72139410655,
        1.06095097163,
    ],
    anisotropy_angles: &STANDARD_ANGLES,
    anisotropy_radii: &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
    anisotropy_values: &[
        &[0.367, 0.724, 0.653, 0.785, 0.900, 0.982, 1.014, 1.030, 1.036, 1.010, 1.000],
        &[0.454, 0.720, 0.671, 0.794, 0.890, 0.954, 0.992, 1.010, 1.026, 1.030, 1.000],
        &[0.922, 0.726, 0.699, 0.809, 0.885, 0.947, 0.985, 1.009, 1.016, 1.019, 1.000],
        &[0.902, 0.738, 0.727, 0.814, 0.892, 0.939, 0.991, 1.007, 1.023, 1.017, 1.000],
        &[0.894, 0.753, 0.732, 0.825, 0.899, 0.943, 0.997, 1.010, 1.011, 1.010, 1.000],
        &[0.893, 0.771, 0.764, 0.852, 0.915, 0.976, 0.989, 1.019, 1.035, 1.020, 1.000],
        &[0.858, 0.800, 0.782, 0.821, 0.873, 0.937, 0.961, 1.002, 1.010, 1.005, 1.000],
    ],
};

static THERAGENICS_200: BuiltinSeed = BuiltinSeed {
    isotope: Isotope::Palladium103,
    in_production: true,
    effective_length: 0.423,
    dose_rate_constant: 0.686,
    radial_radii: &[
        0.1, 0.15, 0.25, 0.3, 0.4, 0.5, 0.75, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 5.0, 6.0, 7.0, 10.0,
    ],
    radial_values: &[
        0.911, 1.21, 1.37, 1.38, 1.36, 1.30, 1.15, 1.000, 0.749, 0.555, 0.410, 0.302, 0.223, 0.163,
        0.0887, 0.0482, 0.0262, 0.00615,
    ],
    cunningham: [
        7.98564887935,
        8.89711127592,
        0.00133256288073,
        1.80353486555,
        1.25321610687,
    ],
    anisotropy_angles: &[
        0.0, 1.0, 2.0, 3.0, 5.0, 7.0, 10.0, 12.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0, 60.0, 70.0,
        75.0, 80.0, 85.0, 90.0,
    ],
    anisotropy_radii: &[0.25, 0.5, 0.75, 1.0, 2.0, 3.0, 4.0, 5.0, 7.5],
    anisotropy_values: &[
        &[
            0.619, 0.617, 0.618, 0.620, 0.617, 0.579, 0.284, 0.191, 0.289, 0.496, 0.655, 0.775,
            0.917, 0.945, 0.976, 0.981, 0.947, 0.992, 1.007, 1.000,
        ],
        &[
            0.694, 0.689, 0.674, 0.642, 0.600, 0.553, 0.496, 0.466, 0.446, 0.442, 0.497, 0.586,
            0.734, 0.837, 0.906, 0.929, 0.938, 0.955, 0.973, 1.000,
        ],
        &[
            0.601, 0.597, 0.574, 0.577, 0.540, 0.519, 0.495, 0.486, 0.482, 0.486, 0.524, 0.585,
            0.726, 0.831, 0.907, 0.954, 0.961, 0.959, 0.960, 1.000,
        ],
        &[
            0.541, 0.549, 0.534, 0.538, 0.510, 0.498, 0.487, 0.487, 0.490, 0.501, 0.537, 0.593,
            0.727, 0.834, 0.912, 0.964, 0.978, 0.972, 0.982, 1.000,
        ],
        &[
            0.526, 0.492, 0.514, 0.506, 0.499, 0.498, 0.504, 0.512, 0.523, 0.547, 0.582, 0.633,
            0.750, 0.853, 0.931, 0.989, 1.006, 1.017, 0.998, 1.000,
        ],
        &[
            0.504, 0.505, 0.517, 0.509, 0.508, 0.509, 0.519, 0.529, 0.540, 0.568, 0.603, 0.654,
            0.766, 0.869, 0.942, 1.001, 1.021, 1.035, 1.030, 1.000,
        ],
        &[
            0.497, 0.513, 0.524, 0.519, 0.514, 0.521, 0.530, 0.544, 0.556, 0.585, 0.621, 0.667,
            0.778, 0.881, 0.960, 1.008, 1.029, 1.046, 1.041, 1.000,
        ],
        &[
            0.513, 0.533, 0.538, 0.532, 0.531, 0.532, 0.544, 0.555, 0.567, 0.605, 0.640, 0.683,
            0.784, 0.886, 0.964, 1.004, 1.024, 1.037, 1.036, 1.000,
        ],
        &[
            0.547, 0.580, 0.568, 0.570, 0.571, 0.568, 0.590, 0.614, 0.614, 0.642, 0.684, 0.719,
            0.820, 0.912, 0.974, 1.011, 1.033, 1.043, 1.043, 1.000,
        ],
    ],
};

pub static BUILTIN_SEEDS: Map<&'static str, &'static BuiltinSeed> = phf_map! {
    "Amersham6711Seed" => &AMERSHAM_6711,
    "Best2301Seed" => &BEST_2301,
    "Theragenics200Seed" => &THERAGENICS_200,
};
