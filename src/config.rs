use crate::codec::IconEncoder;
use crate::error::Result;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

//===========================================================================//

/// The resolutions offered by default, largest first.
pub const DEFAULT_RESOLUTIONS: &[u32] = &[256, 128, 64, 48, 40, 32, 24, 20, 16];

/// Sources smaller than this on either edge are refused by default.
pub const DEFAULT_MIN_SOURCE_SIZE: u32 = 256;

//===========================================================================//

/// Resampling filter used when shrinking the source image.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    /// Nearest neighbor
    Nearest,
    /// Linear
    Triangle,
    /// Cubic
    CatmullRom,
    /// Gaussian
    Gaussian,
    /// Lanczos with window 3
    Lanczos3,
}

impl ResizeFilter {
    /// Returns the matching `image` crate filter.
    pub fn filter_type(self) -> FilterType {
        match self {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

//===========================================================================//

/// Settings loaded once at startup and handed to whoever needs them.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Resolutions to export when none are given explicitly.
    pub resolutions: Vec<u32>,
    /// Resampling filter.
    pub filter: ResizeFilter,
    /// Minimum source edge length; 0 accepts anything.
    pub min_source_size: u32,
    /// Log filter directive, e.g. `info` or `icomaker=debug`.
    pub log_level: String,
    /// Append log output here instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            resolutions: DEFAULT_RESOLUTIONS.to_vec(),
            filter: ResizeFilter::Lanczos3,
            min_source_size: DEFAULT_MIN_SOURCE_SIZE,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Config> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let text = fs::read_to_string(path)?;
        Config::from_toml_str(&text)
    }

    /// Builds an encoder using this config's filter and size limit.
    pub fn encoder(&self) -> IconEncoder {
        IconEncoder::new()
            .with_filter(self.filter.filter_type())
            .with_min_source_size(self.min_source_size)
    }
}

//===========================================================================//


//===========================================================================//
