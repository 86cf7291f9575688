//! Fit a source raster onto a physical label.
//!
//! The source is assumed to have been rasterized at `source_dpi` (96 for
//! browser snapshots). Its physical size is carried over to the printer's
//! dot grid, then scaled uniformly so both axes fit, and centred.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    units::{check_dpi, physical_to_dots, DotGrid, Unit},
};

/// Slack added before flooring so `1800 / 1875 * 1875` lands on 1800.
const FLOOR_EPSILON: f64 = 1e-9;

/// Overshoot, in dots, that is silently clamped to the label edge.
pub const OVERFLOW_TOLERANCE: u32 = 1;

/// Requested label size. Without a height, the label takes the source
/// image's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetSize {
    pub width: f64,
    pub height: Option<f64>,
    #[serde(default)]
    pub unit: Unit,
}

impl TargetSize {
    pub fn new(width: f64, height: Option<f64>, unit: Unit) -> Self {
        TargetSize {
            width,
            height,
            unit,
        }
    }

    pub fn inches(width: f64, height: f64) -> Self {
        Self::new(width, Some(height), Unit::Inch)
    }
}

/// Result of fitting a source onto a label, all in target dots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitPlan {
    /// Full label grid, as declared by `^PW`/`^LL`.
    pub label: DotGrid,
    /// Size the source is resampled to.
    pub scaled: DotGrid,
    pub offset_x: u32,
    pub offset_y: u32,
    /// Factor applied to the source's dot-equivalent size.
    pub scale: f64,
}

/// Plan the scale and placement of a `source_width` x `source_height` pixel
/// image on `target` at `target_dpi`.
pub fn plan(
    source_width: u32,
    source_height: u32,
    source_dpi: u32,
    target: &TargetSize,
    target_dpi: u32,
) -> Result<FitPlan> {
    if source_width == 0 || source_height == 0 {
        return Err(Error::EmptyBitmap {
            width: source_width,
            height: source_height,
        });
    }
    check_dpi(source_dpi)?;
    check_dpi(target_dpi)?;

    let target_width_in = target.unit.to_inches(target.width);
    let label_width = physical_to_dots(target_width_in, target_dpi)?;
    let label_height = match target.height {
        Some(height) => physical_to_dots(target.unit.to_inches(height), target_dpi)?,
        None => {
            let aspect = f64::from(source_height) / f64::from(source_width);
            // a thin strip still needs one row of label
            physical_to_dots(target_width_in * aspect, target_dpi)?.max(1)
        }
    };
    if label_width == 0 || label_height == 0 {
        return Err(Error::InvalidDimension(format!(
            "label of {}x{} dots at {} dpi is empty",
            label_width, label_height, target_dpi
        )));
    }

    // Source size at the target resolution.
    let equiv_width = f64::from(source_width) / f64::from(source_dpi) * f64::from(target_dpi);
    let equiv_height = f64::from(source_height) / f64::from(source_dpi) * f64::from(target_dpi);

    let scale = (f64::from(label_width) / equiv_width).min(f64::from(label_height) / equiv_height);

    let scaled_width = clamp_axis(floor_dots(equiv_width * scale), label_width)
        .map_err(|over| overflow(over, floor_dots(equiv_height * scale), label_width, label_height))?;
    let scaled_height = clamp_axis(floor_dots(equiv_height * scale), label_height)
        .map_err(|over| overflow(scaled_width, over, label_width, label_height))?;

    let plan = FitPlan {
        label: DotGrid::new(label_width, label_height),
        scaled: DotGrid::new(scaled_width, scaled_height),
        offset_x: (label_width - scaled_width) / 2,
        offset_y: (label_height - scaled_height) / 2,
        scale,
    };
    debug!(
        "fit {}x{}@{} onto {}x{}@{}: scale {:.4}, scaled {}x{}, offset ({}, {})",
        source_width,
        source_height,
        source_dpi,
        label_width,
        label_height,
        target_dpi,
        scale,
        scaled_width,
        scaled_height,
        plan.offset_x,
        plan.offset_y
    );
    Ok(plan)
}

fn floor_dots(value: f64) -> u32 {
    // A sliver of an image still needs one row or column of dots.
    ((value + FLOOR_EPSILON).floor() as u32).max(1)
}

/// Clamp `scaled` to `label` within the tolerance, or hand back the
/// offending size.
fn clamp_axis(scaled: u32, label: u32) -> std::result::Result<u32, u32> {
    if scaled <= label {
        Ok(scaled)
    } else if scaled - label <= OVERFLOW_TOLERANCE {
        warn!("scaled size {} clamped to label size {}", scaled, label);
        Ok(label)
    } else {
        Err(scaled)
    }
}

fn overflow(scaled_width: u32, scaled_height: u32, label_width: u32, label_height: u32) -> Error {
    Error::FitOverflow {
        scaled_width,
        scaled_height,
        label_width,
        label_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letterboxes_wide_image_on_landscape_label() {
        let fit = plan(600, 300, 96, &TargetSize::inches(6.0, 4.0), 300).unwrap();
        assert_eq!(fit.label, DotGrid::new(1800, 1200));
        // min(1800 / 1875, 1200 / 937.5)
        assert!((fit.scale - 0.96).abs() < 1e-12);
        assert_eq!(fit.scaled, DotGrid::new(1800, 900));
        assert_eq!((fit.offset_x, fit.offset_y), (0, 150));
    }

    #[test]
    fn keeps_aspect_ratio_within_one_dot() {
        let fit = plan(600, 300, 96, &TargetSize::inches(6.0, 4.0), 300).unwrap();
        let ratio = f64::from(fit.scaled.width) / f64::from(fit.scaled.height);
        let ideal_width = f64::from(fit.scaled.height) * 2.0;
        assert!((f64::from(fit.scaled.width) - ideal_width).abs() <= 1.0, "{}", ratio);
    }

    #[test]
    fn centres_smaller_image() {
        let fit = plan(100, 50, 96, &TargetSize::inches(1.0, 1.0), 203).unwrap();
        assert_eq!(fit.label, DotGrid::new(203, 203));
        assert_eq!(fit.scaled, DotGrid::new(203, 101));
        assert_eq!((fit.offset_x, fit.offset_y), (0, 51));
        assert!(fit.offset_x + fit.scaled.width <= fit.label.width);
        assert!(fit.offset_y + fit.scaled.height <= fit.label.height);
    }

    #[test]
    fn centres_on_both_axes() {
        // 1in x 1in source fills a 2in x 3in label to 2in x 2in
        let fit = plan(96, 96, 96, &TargetSize::inches(2.0, 3.0), 203).unwrap();
        assert_eq!(fit.label, DotGrid::new(406, 609));
        assert_eq!(fit.scaled, DotGrid::new(406, 406));
        assert_eq!((fit.offset_x, fit.offset_y), (0, 101));

        let fit = plan(96, 96, 96, &TargetSize::inches(3.0, 2.0), 203).unwrap();
        assert_eq!((fit.offset_x, fit.offset_y), (101, 0));
    }

    #[test]
    fn derives_height_from_aspect_ratio() {
        let target = TargetSize::new(2.0, None, Unit::Inch);
        let fit = plan(600, 300, 96, &target, 203).unwrap();
        assert_eq!(fit.label, DotGrid::new(406, 203));
        assert_eq!(fit.scaled, DotGrid::new(406, 203));
        assert_eq!((fit.offset_x, fit.offset_y), (0, 0));
    }

    #[test]
    fn derived_height_is_at_least_one_dot() {
        let target = TargetSize::new(1.0, None, Unit::Inch);
        let fit = plan(10_000, 1, 96, &target, 203).unwrap();
        assert_eq!(fit.label, DotGrid::new(203, 1));
        assert_eq!(fit.scaled, DotGrid::new(203, 1));
        assert_eq!((fit.offset_x, fit.offset_y), (0, 0));
    }

    #[test]
    fn accepts_millimeters() {
        let target = TargetSize::new(50.8, Some(25.4), Unit::Millimeter);
        let fit = plan(200, 100, 96, &target, 203).unwrap();
        assert_eq!(fit.label, DotGrid::new(406, 203));
    }

    #[test]
    fn rejects_bad_input() {
        let target = TargetSize::inches(1.0, 1.0);
        assert!(matches!(
            plan(0, 0, 96, &target, 203),
            Err(Error::EmptyBitmap { .. })
        ));
        assert!(matches!(
            plan(10, 10, 0, &target, 203),
            Err(Error::InvalidDimension(_))
        ));
        assert!(matches!(
            plan(10, 10, 96, &TargetSize::inches(-1.0, 1.0), 203),
            Err(Error::InvalidDimension(_))
        ));
        assert!(matches!(
            plan(10, 10, 96, &TargetSize::inches(0.0, 1.0), 203),
            Err(Error::InvalidDimension(_))
        ));
    }

    #[test]
    fn clamps_single_dot_overshoot() {
        assert_eq!(clamp_axis(204, 203), Ok(203));
        assert_eq!(clamp_axis(200, 203), Ok(200));
        assert_eq!(clamp_axis(205, 203), Err(205));
    }
}
