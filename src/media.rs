use serde::{Deserialize, Serialize};

use crate::units::PhysicalSize;

/// Label stock the product labels are printed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStock {
    ProductFront,
    ProductSide,
    Carton5x2_5,
    Shipping4x6,
}

impl LabelStock {
    pub fn size(&self) -> PhysicalSize {
        match self {
            Self::ProductFront => PhysicalSize::inches(5.80, 4.58),
            Self::ProductSide => PhysicalSize::inches(3.48, 6.03),
            Self::Carton5x2_5 => PhysicalSize::inches(5.0, 2.5),
            Self::Shipping4x6 => PhysicalSize::inches(4.0, 6.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::DotGrid;

    #[test]
    fn carton_stock_size() {
        let grid = LabelStock::Carton5x2_5.size().to_dots(203).unwrap();
        assert_eq!(grid, DotGrid::new(1015, 508));
    }

    #[test]
    fn product_stock_sizes() {
        let front = LabelStock::ProductFront.size().to_dots(203).unwrap();
        assert_eq!(front, DotGrid::new(1177, 930));
        let side = LabelStock::ProductSide.size().to_dots(203).unwrap();
        assert_eq!(side, DotGrid::new(706, 1224));
    }
}
