use nnp::core::vib::EigenSettings;

pub struct DefaultsConfig {
    pub pbc: [bool; 3],
    pub cell: [[f64; 3]; 3],
    pub eigen: EigenSettings,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            pbc: [false; 3],
            cell: [[0.0; 3]; 3],
            eigen: EigenSettings::default(),
        }
    }
}
