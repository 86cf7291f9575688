//! Label documents: one `^XA … ^XZ` frame around an ordered list of fields.

use log::{info, warn};

use crate::{
    error::{Error, Result},
    graphic::GraphicField,
    units::DotGrid,
};

/// Field origin in label dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Origin {
    pub x: u32,
    pub y: u32,
}

impl Origin {
    pub fn new(x: u32, y: u32) -> Self {
        Origin { x, y }
    }
}

/// A typed field descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Scalable font 0 text.
    Text {
        origin: Origin,
        char_height: u32,
        char_width: u32,
        content: String,
    },
    /// Code 128 barcode with the interpretation line printed below.
    Barcode {
        origin: Origin,
        module_width: u32,
        height: u32,
        content: String,
    },
    Graphic(GraphicField),
}

impl Field {
    pub fn text(x: u32, y: u32, char_height: u32, char_width: u32, content: impl Into<String>) -> Self {
        Field::Text {
            origin: Origin::new(x, y),
            char_height,
            char_width,
            content: content.into(),
        }
    }

    pub fn barcode(x: u32, y: u32, module_width: u32, height: u32, content: impl Into<String>) -> Self {
        Field::Barcode {
            origin: Origin::new(x, y),
            module_width,
            height,
            content: content.into(),
        }
    }

    fn is_non_ascii(&self) -> bool {
        match self {
            Field::Text { content, .. } | Field::Barcode { content, .. } => !content.is_ascii(),
            Field::Graphic(_) => false,
        }
    }

    fn validate(&self, frame: DotGrid) -> Result<()> {
        match self {
            Field::Text { origin, content, .. } | Field::Barcode { origin, content, .. } => {
                validate_content(content)?;
                if origin.x >= frame.width || origin.y >= frame.height {
                    warn!(
                        "field '{}' at ({}, {}) starts outside the {}x{} label",
                        content, origin.x, origin.y, frame.width, frame.height
                    );
                }
                Ok(())
            }
            Field::Graphic(graphic) => {
                if !frame.contains(graphic.x, graphic.y, graphic.size()) {
                    return Err(Error::FitOverflow {
                        scaled_width: graphic.x.saturating_add(graphic.size().width),
                        scaled_height: graphic.y.saturating_add(graphic.size().height),
                        label_width: frame.width,
                        label_height: frame.height,
                    });
                }
                Ok(())
            }
        }
    }

    fn to_zpl(&self) -> String {
        match self {
            Field::Text {
                origin,
                char_height,
                char_width,
                content,
            } => format!(
                "^FO{},{}^A0N,{},{}^FD{}^FS",
                origin.x, origin.y, char_height, char_width, content
            ),
            Field::Barcode {
                origin,
                module_width,
                height,
                content,
            } => format!(
                "^FO{},{}^BY{}^BCN,{},Y,N,N^FD{}^FS",
                origin.x, origin.y, module_width, height, content
            ),
            Field::Graphic(graphic) => graphic.to_zpl(),
        }
    }
}

fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(Error::InvalidField("field content is empty".to_string()));
    }
    // ^ and ~ would start a new command inside ^FD
    if content.contains(&['^', '~'][..]) {
        return Err(Error::InvalidField(format!(
            "field content '{}' contains a ZPL command prefix",
            content
        )));
    }
    Ok(())
}

/// A complete label program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDocument {
    size: DotGrid,
    fields: Vec<Field>,
    force_utf8: bool,
}

impl LabelDocument {
    pub fn new(size: DotGrid) -> Self {
        LabelDocument {
            size,
            fields: Vec::new(),
            force_utf8: false,
        }
    }

    /// Emit `^CI28` even when every field is ASCII.
    pub fn force_utf8(self, flag: bool) -> Self {
        LabelDocument {
            force_utf8: flag,
            ..self
        }
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.push(field);
        self
    }

    pub fn size(&self) -> DotGrid {
        self.size
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Render the document, or nothing at all if any field is invalid.
    pub fn render(&self) -> Result<String> {
        if self.size.width == 0 || self.size.height == 0 {
            return Err(Error::InvalidDimension(format!(
                "label frame {}x{} is empty",
                self.size.width, self.size.height
            )));
        }
        for field in &self.fields {
            field.validate(self.size)?;
        }

        let mut lines = vec![
            "^XA".to_string(),
            format!("^PW{}", self.size.width),
            format!("^LL{}", self.size.height),
            "^LH0,0".to_string(),
        ];
        // multi-byte text renders as garbage without UTF-8 selected first
        if self.force_utf8 || self.fields.iter().any(Field::is_non_ascii) {
            lines.push("^CI28".to_string());
        }
        lines.extend(self.fields.iter().map(Field::to_zpl));
        lines.push("^XZ".to_string());

        info!(
            "rendered {}x{} label with {} fields",
            self.size.width,
            self.size.height,
            self.fields.len()
        );
        Ok(lines.join("\n"))
    }
}

/// X origin that centres `text` horizontally, assuming fixed-width glyphs.
pub fn centered_x(label_width: u32, text: &str, font_width: u32) -> u32 {
    let text_width = text.chars().count() as u64 * u64::from(font_width);
    (u64::from(label_width).saturating_sub(text_width) / 2) as u32
}

/// Y origin that centres one line of `font_height` vertically.
pub fn centered_y(label_height: u32, font_height: u32) -> u32 {
    label_height.saturating_sub(font_height) / 2
}
