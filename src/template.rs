//! Front and side product labels built from catalogue data.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    bitmap::Bitmap,
    config::LabelConfig,
    error::{Error, Result},
    label::{centered_x, centered_y, Field, LabelDocument},
    media::LabelStock,
    pipeline,
    units::Unit,
};

/// Product labels are laid out for 8 dpmm printers.
pub const PRODUCT_LABEL_DPI: u32 = 203;

const TITLE_FONT: u32 = 80;
const BODY_FONT: u32 = 30;
const LINE_PITCH: u32 = 40;
const MARGIN: u32 = 30;
/// Graphics (user manual QR codes and the like) go into a square this wide.
const GRAPHIC_BOX_INCHES: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelSide {
    Front,
    Side,
}

impl FromStr for LabelSide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "front" => Ok(Self::Front),
            "side" => Ok(Self::Side),
            _ => Err(Error::InvalidConfig(format!("unknown label side '{}'", s))),
        }
    }
}

/// Carton size in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartonDimensions {
    pub height: f64,
    pub width: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLabel {
    pub model_name: String,
    pub brand_name: String,
    #[serde(default)]
    pub category_name: String,
    pub serial_number: String,
    pub carton: CartonDimensions,
}

impl ProductLabel {
    pub fn stock(side: LabelSide) -> LabelStock {
        match side {
            LabelSide::Front => LabelStock::ProductFront,
            LabelSide::Side => LabelStock::ProductSide,
        }
    }

    /// Lay out one side of the label, optionally with a graphic.
    pub fn compose(&self, side: LabelSide, graphic: Option<&Bitmap>) -> Result<LabelDocument> {
        let grid = Self::stock(side).size().to_dots(PRODUCT_LABEL_DPI)?;
        let mut doc = LabelDocument::new(grid);

        let graphic_origin = match side {
            LabelSide::Front => {
                let x = centered_x(grid.width, &self.model_name, TITLE_FONT);
                let y = centered_y(grid.height, TITLE_FONT);
                doc.push(Field::text(x, y, TITLE_FONT, TITLE_FONT, self.model_name.as_str()));
                doc.push(Field::text(
                    x,
                    y + TITLE_FONT,
                    TITLE_FONT - 20,
                    TITLE_FONT - 50,
                    self.brand_name.as_str(),
                ));
                (x + 120, y + 2 * TITLE_FONT)
            }
            LabelSide::Side => {
                let mut lines = Vec::new();
                if !self.category_name.trim().is_empty() {
                    lines.push(format!("Product: {}", self.category_name));
                }
                lines.push(format!(
                    "Brand/Model: {}, {}",
                    self.brand_name, self.model_name
                ));
                lines.push(format!("Serial Number: {}", self.serial_number));
                lines.push(format!(
                    "Dimensions: {}\"H x {}\"W x {}\"D",
                    self.carton.height, self.carton.width, self.carton.depth
                ));

                let mut y = MARGIN;
                for line in lines {
                    doc.push(Field::text(MARGIN, y, BODY_FONT, BODY_FONT, line));
                    y += LINE_PITCH;
                }

                y += LINE_PITCH / 2;
                doc.push(Field::barcode(MARGIN, y, 2, 100, self.serial_number.as_str()));
                // barcode plus its interpretation line
                (MARGIN, y + 160)
            }
        };

        if let Some(bitmap) = graphic {
            let options = LabelConfig::new(GRAPHIC_BOX_INCHES, Unit::Inch)
                .height(GRAPHIC_BOX_INCHES)
                .target_dpi(PRODUCT_LABEL_DPI)
                .validate()?;
            let (_, field) = pipeline::graphic_field(bitmap, &options)?;
            doc.push(Field::Graphic(
                field.moved_by(graphic_origin.0, graphic_origin.1),
            ));
        }

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> ProductLabel {
        ProductLabel {
            model_name: "PS-5".to_string(),
            brand_name: "Acme".to_string(),
            category_name: "音频信号分配器".to_string(),
            serial_number: "4033653231923".to_string(),
            carton: CartonDimensions {
                height: 21.5,
                width: 12.3,
                depth: 7.0,
            },
        }
    }

    #[test]
    fn front_centres_model_name() {
        let zpl = product().compose(LabelSide::Front, None).unwrap().render().unwrap();
        assert!(zpl.starts_with("^XA\n^PW1177\n^LL930\n"));
        // (1177 - 4 * 80) / 2 = 428, (930 - 80) / 2 = 425
        assert!(zpl.contains("^FO428,425^A0N,80,80^FDPS-5^FS"));
        assert!(zpl.contains("^FO428,505^A0N,60,30^FDAcme^FS"));
        assert!(!zpl.contains("^CI28"));
    }

    #[test]
    fn side_lists_details_and_barcode() {
        let zpl = product().compose(LabelSide::Side, None).unwrap().render().unwrap();
        assert!(zpl.starts_with("^XA\n^PW706\n^LL1224\n^LH0,0\n^CI28\n"));
        assert!(zpl.contains("^FO30,30^A0N,30,30^FDProduct: 音频信号分配器^FS"));
        assert!(zpl.contains("^FO30,70^A0N,30,30^FDBrand/Model: Acme, PS-5^FS"));
        assert!(zpl.contains("^FO30,150^A0N,30,30^FDDimensions: 21.5\"H x 12.3\"W x 7\"D^FS"));
        assert!(zpl.contains("^FO30,210^BY2^BCN,100,Y,N,N^FD4033653231923^FS"));
        assert!(zpl.ends_with("^XZ"));
    }

    #[test]
    fn places_graphic_inside_box() {
        let qr = Bitmap::filled(96, 96, [0, 0, 0, 255]);
        let doc = product().compose(LabelSide::Front, Some(&qr)).unwrap();
        let graphic = doc
            .fields()
            .iter()
            .find_map(|f| match f {
                Field::Graphic(g) => Some(g.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!((graphic.x, graphic.y), (548, 585));
        assert_eq!(graphic.size().width, 203);
        assert!(doc.render().is_ok());
    }

    #[test]
    fn rejects_empty_serial() {
        let mut product = product();
        product.serial_number = String::new();
        let doc = product.compose(LabelSide::Side, None).unwrap();
        assert!(matches!(doc.render(), Err(Error::InvalidField(_))));
    }

    #[test]
    fn parses_side() {
        assert_eq!("Front".parse::<LabelSide>().unwrap(), LabelSide::Front);
        assert!("back".parse::<LabelSide>().is_err());
    }
}
