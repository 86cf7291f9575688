//! Label generation configuration.
//!
//! [`LabelConfig`] is the one serialized shape of generation parameters. It
//! is checked once by [`LabelConfig::validate`], which hands back the
//! [`RenderOptions`] the pipeline consumes without further checks.

use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    density::PrintDensity,
    error::{Error, Result},
    fit::TargetSize,
    graphic::GraphicEncoding,
    limits::Limits,
    units::{check_dpi, check_length, Unit},
};

pub const CONFIG_VERSION: u32 = 1;
pub const DEFAULT_TARGET_DPI: u32 = 300;
/// Resolution browsers rasterize at.
pub const DEFAULT_SOURCE_DPI: u32 = 96;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelConfig {
    pub version: u32,
    pub width: f64,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub unit: Unit,
    #[serde(default)]
    pub target_dpi: Option<u32>,
    #[serde(default)]
    pub source_dpi: Option<u32>,
    #[serde(default)]
    pub encoding: GraphicEncoding,
    #[serde(default)]
    pub force_utf8: bool,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl LabelConfig {
    /// Initialize configuration with a label width and default values.
    ///
    /// # Example
    ///
    /// ```
    /// use zpl_label::{LabelConfig, Unit};
    ///
    /// let options = LabelConfig::new(4.0, Unit::Inch)
    ///     .height(6.0)
    ///     .target_dpi(203)
    ///     .validate()
    ///     .unwrap();
    /// assert_eq!(options.target_dpi(), 203);
    /// ```
    pub fn new(width: f64, unit: Unit) -> Self {
        LabelConfig {
            version: CONFIG_VERSION,
            width,
            height: None,
            unit,
            target_dpi: None,
            source_dpi: None,
            encoding: GraphicEncoding::default(),
            force_utf8: false,
            limits: Limits::default(),
            timeout_ms: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn height(self, height: f64) -> Self {
        LabelConfig {
            height: Some(height),
            ..self
        }
    }

    pub fn target_dpi(self, dpi: u32) -> Self {
        LabelConfig {
            target_dpi: Some(dpi),
            ..self
        }
    }

    pub fn source_dpi(self, dpi: u32) -> Self {
        LabelConfig {
            source_dpi: Some(dpi),
            ..self
        }
    }

    pub fn encoding(self, encoding: GraphicEncoding) -> Self {
        LabelConfig { encoding, ..self }
    }

    pub fn force_utf8(self, flag: bool) -> Self {
        LabelConfig {
            force_utf8: flag,
            ..self
        }
    }

    pub fn limits(self, limits: Limits) -> Self {
        LabelConfig { limits, ..self }
    }

    pub fn timeout_ms(self, ms: u64) -> Self {
        LabelConfig {
            timeout_ms: Some(ms),
            ..self
        }
    }

    pub fn validate(&self) -> Result<RenderOptions> {
        if self.version != CONFIG_VERSION {
            return Err(Error::InvalidConfig(format!(
                "unsupported config version {}, expected {}",
                self.version, CONFIG_VERSION
            )));
        }

        check_positive(self.width, "width")?;
        if let Some(height) = self.height {
            check_positive(height, "height")?;
        }

        let target_dpi = self.target_dpi.unwrap_or(DEFAULT_TARGET_DPI);
        let source_dpi = self.source_dpi.unwrap_or(DEFAULT_SOURCE_DPI);
        check_dpi(target_dpi)?;
        check_dpi(source_dpi)?;
        if PrintDensity::from_dpi(target_dpi).is_none() {
            debug!("target dpi {} is not a standard print density", target_dpi);
        }

        let timeout = match self.timeout_ms {
            Some(0) => {
                return Err(Error::InvalidConfig(
                    "timeout_ms must be positive".to_string(),
                ))
            }
            Some(ms) => Some(Duration::from_millis(ms)),
            None => None,
        };

        Ok(RenderOptions {
            target: TargetSize::new(self.width, self.height, self.unit),
            target_dpi,
            source_dpi,
            encoding: self.encoding,
            force_utf8: self.force_utf8,
            limits: self.limits.clone(),
            timeout,
        })
    }
}

fn check_positive(value: f64, what: &str) -> Result<()> {
    check_length(value, what)?;
    if value == 0.0 {
        return Err(Error::InvalidDimension(format!("{} must be positive", what)));
    }
    Ok(())
}

/// Validated generation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    target: TargetSize,
    target_dpi: u32,
    source_dpi: u32,
    encoding: GraphicEncoding,
    force_utf8: bool,
    limits: Limits,
    timeout: Option<Duration>,
}

impl RenderOptions {
    pub fn target(&self) -> &TargetSize {
        &self.target
    }

    pub fn target_dpi(&self) -> u32 {
        self.target_dpi
    }

    pub fn source_dpi(&self) -> u32 {
        self.source_dpi
    }

    pub fn encoding(&self) -> GraphicEncoding {
        self.encoding
    }

    pub fn force_utf8(&self) -> bool {
        self.force_utf8
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
