/// Values used when neither the command line nor the config file sets them.
pub struct DefaultsConfig {
    pub planner: String,
    pub seed_name: String,
    pub seed_strength: f64,
    pub prescribed_dose_gy: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            planner: "iiem".to_string(),
            seed_name: "Amersham6711Seed".to_string(),
            seed_strength: 0.5,
            prescribed_dose_gy: 145.0,
        }
    }
}
