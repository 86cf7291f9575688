//! Physical size and dot conversions.
//!
//! All conversions into dots use `round`. The label frame (`^PW`/`^LL`) and
//! the fields placed inside it must be sized with the same policy or they
//! drift apart by a dot and clip.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MM_PER_INCH: f64 = 25.4;

/// Unit of a physical measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "in")]
    Inch,
    #[serde(rename = "mm")]
    Millimeter,
}

impl Default for Unit {
    fn default() -> Self {
        Self::Inch
    }
}

impl std::str::FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "in" | "inch" | "inches" => Ok(Self::Inch),
            "mm" | "millimeter" | "millimeters" => Ok(Self::Millimeter),
            _ => Err(Error::InvalidConfig(format!("unknown unit '{}'", s))),
        }
    }
}

impl Unit {
    /// Convert a value in this unit to inches.
    pub fn to_inches(self, value: f64) -> f64 {
        match self {
            Self::Inch => value,
            Self::Millimeter => value / MM_PER_INCH,
        }
    }
}

pub fn inches_to_millimeters(inches: f64) -> f64 {
    (inches * MM_PER_INCH).round()
}

pub fn millimeters_to_pixels(mm: f64, dpi: u32) -> Result<u32> {
    check_length(mm, "millimeters")?;
    physical_to_dots(mm / MM_PER_INCH, dpi)
}

/// Convert a length in inches to printer dots at `dpi`.
///
/// Fails with `InvalidDimension` for negative or non-finite lengths and for a
/// DPI of zero.
pub fn physical_to_dots(inches: f64, dpi: u32) -> Result<u32> {
    check_length(inches, "length")?;
    check_dpi(dpi)?;
    let dots = (inches * f64::from(dpi)).round();
    if dots > f64::from(u32::MAX) {
        return Err(Error::InvalidDimension(format!(
            "{} inches at {} dpi overflows the dot grid",
            inches, dpi
        )));
    }
    Ok(dots as u32)
}

pub(crate) fn check_length(value: f64, what: &str) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidDimension(format!(
            "{} must be finite and non-negative, got {}",
            what, value
        )));
    }
    Ok(())
}

pub(crate) fn check_dpi(dpi: u32) -> Result<()> {
    if dpi == 0 {
        return Err(Error::InvalidDimension("dpi must be positive".to_string()));
    }
    Ok(())
}

/// A width and height in a stated physical unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSize {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub unit: Unit,
}

impl PhysicalSize {
    pub fn new(width: f64, height: f64, unit: Unit) -> Self {
        PhysicalSize {
            width,
            height,
            unit,
        }
    }

    pub fn inches(width: f64, height: f64) -> Self {
        Self::new(width, height, Unit::Inch)
    }

    pub fn millimeters(width: f64, height: f64) -> Self {
        Self::new(width, height, Unit::Millimeter)
    }

    /// `(width, height)` in inches.
    pub fn to_inches(&self) -> (f64, f64) {
        (self.unit.to_inches(self.width), self.unit.to_inches(self.height))
    }

    pub fn to_dots(&self, dpi: u32) -> Result<DotGrid> {
        let (w, h) = self.to_inches();
        Ok(DotGrid {
            width: physical_to_dots(w, dpi)?,
            height: physical_to_dots(h, dpi)?,
        })
    }
}

/// A size in whole printer dots at some DPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DotGrid {
    pub width: u32,
    pub height: u32,
}

impl DotGrid {
    pub fn new(width: u32, height: u32) -> Self {
        DotGrid { width, height }
    }

    /// Whether a `size` box placed at `(x, y)` lies entirely inside this grid.
    pub fn contains(&self, x: u32, y: u32, size: DotGrid) -> bool {
        u64::from(x) + u64::from(size.width) <= u64::from(self.width)
            && u64::from(y) + u64::from(size.height) <= u64::from(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_inches_to_whole_millimeters() {
        assert_eq!(inches_to_millimeters(1.0), 25.0);
        assert_eq!(inches_to_millimeters(4.0), 102.0);
        assert_eq!(inches_to_millimeters(6.0), 152.0);
    }

    #[test]
    fn converts_millimeters_to_pixels() {
        assert_eq!(millimeters_to_pixels(25.4, 300).unwrap(), 300);
        assert_eq!(millimeters_to_pixels(62.0, 300).unwrap(), 732);
        assert_eq!(millimeters_to_pixels(29.0, 300).unwrap(), 343);
    }

    #[test]
    fn rounds_rather_than_floors() {
        // 5.80in * 203 = 1177.4, 4.58in * 203 = 929.74
        assert_eq!(physical_to_dots(5.80, 203).unwrap(), 1177);
        assert_eq!(physical_to_dots(4.58, 203).unwrap(), 930);
        assert_eq!(physical_to_dots(2.5, 203).unwrap(), 508);
    }

    #[test]
    fn rejects_bad_lengths() {
        assert!(matches!(
            physical_to_dots(-1.0, 203),
            Err(Error::InvalidDimension(_))
        ));
        assert!(matches!(
            physical_to_dots(f64::NAN, 203),
            Err(Error::InvalidDimension(_))
        ));
        assert!(matches!(
            physical_to_dots(f64::INFINITY, 203),
            Err(Error::InvalidDimension(_))
        ));
        assert!(matches!(
            physical_to_dots(1.0, 0),
            Err(Error::InvalidDimension(_))
        ));
    }

    #[test]
    fn converts_physical_size_in_either_unit() {
        let inches = PhysicalSize::inches(4.0, 6.0).to_dots(203).unwrap();
        assert_eq!(inches, DotGrid::new(812, 1218));

        let mm = PhysicalSize::millimeters(101.6, 152.4).to_dots(203).unwrap();
        assert_eq!(mm, inches);
    }

    #[test]
    fn parses_units() {
        assert_eq!("mm".parse::<Unit>().unwrap(), Unit::Millimeter);
        assert_eq!("Inches".parse::<Unit>().unwrap(), Unit::Inch);
        assert!("px".parse::<Unit>().is_err());
    }

    #[test]
    fn grid_contains_boxes() {
        let grid = DotGrid::new(203, 203);
        assert!(grid.contains(0, 51, DotGrid::new(203, 101)));
        assert!(!grid.contains(1, 0, DotGrid::new(203, 1)));
    }
}
