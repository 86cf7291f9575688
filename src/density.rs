use serde::{Deserialize, Serialize};

use crate::units::MM_PER_INCH;

/// Print head resolutions found on Zebra printers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrintDensity {
    Dpmm6,
    Dpmm8, // 203 dpi, most desktop printers
    Dpmm12,
    Dpmm24,
}

impl PrintDensity {
    /// Pick the density matching `dpi`, if it is one of the standard ones.
    pub fn from_dpi(dpi: u32) -> Option<Self> {
        let dpmm = (f64::from(dpi) / MM_PER_INCH).round() as u32;
        match dpmm {
            6 => Some(Self::Dpmm6),
            8 => Some(Self::Dpmm8),
            12 => Some(Self::Dpmm12),
            24 => Some(Self::Dpmm24),
            _ => None,
        }
    }

    pub fn dpi(&self) -> u32 {
        match self {
            Self::Dpmm6 => 152,
            Self::Dpmm8 => 203,
            Self::Dpmm12 => 300,
            Self::Dpmm24 => 600,
        }
    }

    pub fn dpmm(&self) -> u32 {
        match self {
            Self::Dpmm6 => 6,
            Self::Dpmm8 => 8,
            Self::Dpmm12 => 12,
            Self::Dpmm24 => 24,
        }
    }
}
