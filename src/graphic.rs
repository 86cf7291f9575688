//! `^GFA` graphic fields.
//!
//! A field is emitted as
//! `^FO<x>,<y>^GFA,<total>,<total>,<bytes per row>,<data>^FS`. Both byte
//! counts are the uncompressed size of the whole image because the field and
//! the graphic coincide.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    raster::MonochromeBitstream,
    units::DotGrid,
};

/// How the payload of a graphic field is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphicEncoding {
    /// Plain uppercase hex, two digits per byte.
    Hex,
    /// Hex with ZPL ASCII run-length compression.
    Compressed,
}

impl Default for GraphicEncoding {
    fn default() -> Self {
        Self::Hex
    }
}

/// An encoded monochrome image placed at `(x, y)` in label dots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicField {
    pub x: u32,
    pub y: u32,
    width: u32,
    height: u32,
    total_bytes: usize,
    bytes_per_row: usize,
    data: String,
}

impl GraphicField {
    /// Encode `bits` for placement at `(x, y)`.
    ///
    /// The byte count derived from the row geometry is checked against the
    /// bytes the packer produced, and against the hex payload length.
    pub fn new(bits: &MonochromeBitstream, x: u32, y: u32, encoding: GraphicEncoding) -> Result<Self> {
        let bytes_per_row = bits.bytes_per_row();
        let total_bytes = bytes_per_row * bits.height() as usize;

        check_count(total_bytes, bits.total_bytes())?;
        check_count(bits.height() as usize, bits.rows().len())?;
        for row in bits.rows() {
            check_count(bytes_per_row, row.len())?;
        }

        let hex = bits.to_hex();
        check_count(total_bytes * 2, hex.len())?;

        let data = match encoding {
            GraphicEncoding::Hex => hex,
            GraphicEncoding::Compressed => compress(&hex, bytes_per_row),
        };
        debug!(
            "graphic field at ({}, {}): {} bytes, {} per row, {} payload chars",
            x,
            y,
            total_bytes,
            bytes_per_row,
            data.len()
        );

        Ok(GraphicField {
            x,
            y,
            width: bits.width(),
            height: bits.height(),
            total_bytes,
            bytes_per_row,
            data,
        })
    }

    /// Shift the field origin, e.g. into a box placed elsewhere on a label.
    pub fn moved_by(self, dx: u32, dy: u32) -> Self {
        GraphicField {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..self
        }
    }

    /// Dots covered by the image, padding excluded.
    pub fn size(&self) -> DotGrid {
        DotGrid::new(self.width, self.height)
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    pub fn rows(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    /// The `^FO…^GFA…^FS` command.
    pub fn to_zpl(&self) -> String {
        format!(
            "^FO{},{}^GFA,{},{},{},{}^FS",
            self.x, self.y, self.total_bytes, self.total_bytes, self.bytes_per_row, self.data
        )
    }
}

fn check_count(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::EncodingMismatch { expected, actual });
    }
    Ok(())
}

/// Compress a hex payload row by row with the ZPL ASCII scheme.
///
/// A row equal to the one before it collapses to `:`.
fn compress(hex: &str, bytes_per_row: usize) -> String {
    let mut out = String::new();
    let mut last_line = String::new();

    for row in hex.as_bytes().chunks(bytes_per_row * 2) {
        // chunks of an ASCII hex string are ASCII
        let row = std::str::from_utf8(row).unwrap_or_default();
        let line = compress_line(row);
        if line == last_line {
            out.push(':');
        } else {
            out.push_str(&line);
            last_line = line;
        }
    }
    out
}

/// Compress one row of hex digits.
///
/// A run that reaches the end of the row is written as `,` when it is all
/// `0` and `!` when it is all `F`.
fn compress_line(row: &str) -> String {
    let mut line = String::new();
    let mut chars = row.chars().peekable();

    while let Some(c) = chars.next() {
        let mut count = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            count += 1;
        }

        if count == 1 {
            line.push(c);
        } else if chars.peek().is_none() && c == '0' {
            line.push(',');
        } else if chars.peek().is_none() && c == 'F' {
            line.push('!');
        } else {
            line.push_str(&repeat_code(c, count));
        }
    }
    line
}

fn repeat_code(c: char, mut count: usize) -> String {
    // 'G' is 1 repeat .. 'Y' is 19; 'g' is 20 .. 'z' is 400
    const LOW: &[u8; 19] = b"GHIJKLMNOPQRSTUVWXY";
    const HIGH: &[u8; 20] = b"ghijklmnopqrstuvwxyz";
    const MAX_REPEAT: usize = 419;

    let mut s = String::new();
    while count > MAX_REPEAT {
        s.push_str(&repeat_code(c, MAX_REPEAT));
        count -= MAX_REPEAT;
    }

    let high = count / 20;
    let low = count % 20;
    if high > 0 {
        s.push(HIGH[high - 1] as char);
    }
    if low > 0 {
        s.push(LOW[low - 1] as char);
    }
    s.push(c);
    s
}
