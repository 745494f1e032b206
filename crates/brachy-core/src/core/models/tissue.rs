use std::fmt;

/// Structures that carry a voxel mask in the patient data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Organ {
    Prostate,
    Urethra,
    Margin,
    Rectum,
}

impl Organ {
    pub const ALL: [Organ; 4] = [Organ::Prostate, Organ::Urethra, Organ::Margin, Organ::Rectum];

    pub fn as_str(self) -> &'static str {
        match self {
            Organ::Prostate => "prostate",
            Organ::Urethra => "urethra",
            Organ::Margin => "margin",
            Organ::Rectum => "rectum",
        }
    }
}

impl fmt::Display for Organ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a single voxel, resolved by the priority chain
/// prostate > urethra > rectum > margin > normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TissueType {
    Prostate,
    Urethra,
    Rectum,
    Margin,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TissueMasks {
    pub prostate: Vec<bool>,
    pub urethra: Vec<bool>,
    pub margin: Vec<bool>,
    pub rectum: Vec<bool>,
}

impl TissueMasks {
    pub fn mask(&self, organ: Organ) -> &[bool] {
        match organ {
            Organ::Prostate => &self.prostate,
            Organ::Urethra => &self.urethra,
            Organ::Margin => &self.margin,
            Organ::Rectum => &self.rectum,
        }
    }

    pub fn count(&self, organ: Organ) -> usize {
        self.mask(organ).iter().filter(|&&v| v).count()
    }

    pub fn tissue_type(&self, index: usize) -> TissueType {
        if self.prostate[index] {
            TissueType::Prostate
        } else if self.urethra[index] {
            TissueType::Urethra
        } else if self.rectum[index] {
            TissueType::Rectum
        } else if self.margin[index] {
            TissueType::Margin
        } else {
            TissueType::Normal
        }
    }
}
