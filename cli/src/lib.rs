use std::fs;
use std::path::{Path, PathBuf};

use canopy::{BoundingBox, CanopyConfig, FireHotspots, Region, ScanCommand, SoilExposure};
use strum::IntoEnumIterator;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Canopy(#[from] canopy::CanopyError),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Loading and saving detector configuration files
pub trait ConfigFile: Sized {
    fn from_toml(content: &str) -> Result<Self, CliError>;
    fn from_json(content: &str) -> Result<Self, CliError>;
    fn to_toml(&self) -> Result<String, CliError>;
    fn to_json(&self) -> Result<String, CliError>;

    /// Auto-detect file format and load configuration
    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&fs::read_to_string(path_ref)?),
            Some("json") => Self::from_json(&fs::read_to_string(path_ref)?),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }
}

impl ConfigFile for CanopyConfig {
    fn from_toml(content: &str) -> Result<Self, CliError> {
        let config: CanopyConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn from_json(content: &str) -> Result<Self, CliError> {
        let config: CanopyConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `<output_dir>/<input stem>_<suffix>.png`
pub fn annotated_output_path(output_dir: &Path, input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    output_dir.join(format!("{stem}_{suffix}.png"))
}

/// One `name: description` line per scan command
pub fn command_listing() -> Vec<String> {
    ScanCommand::iter()
        .map(|command| format!("{}: {}", command, command.description()))
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RegionReport {
    pub bounding_box: BoundingBox,
    /// Filled pixel area used for filtering
    pub area: u64,
    /// Shoelace area of the outer contour
    pub polygon_area: f64,
    pub perimeter: f64,
    pub centroid: [f64; 2],
}

impl From<&Region> for RegionReport {
    fn from(region: &Region) -> Self {
        Self {
            bounding_box: region.bounding_box,
            area: region.area,
            polygon_area: region.polygon_area(),
            perimeter: region.perimeter(),
            centroid: region.centroid(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SoilReport {
    pub total_area_pixels: u64,
    pub output: String,
    pub regions: Vec<RegionReport>,
}

impl SoilReport {
    pub fn new(result: &SoilExposure, output: &Path) -> Self {
        Self {
            total_area_pixels: result.total_area_pixels,
            output: output.to_string_lossy().to_string(),
            regions: result.regions.iter().map(RegionReport::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FireReport {
    pub hotspot_count: usize,
    pub output: String,
    pub regions: Vec<RegionReport>,
}

impl FireReport {
    pub fn new(result: &FireHotspots, output: &Path) -> Self {
        Self {
            hotspot_count: result.hotspot_count,
            output: output.to_string_lossy().to_string(),
            regions: result.regions.iter().map(RegionReport::from).collect(),
        }
    }
}

/// Summary of one CLI run
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ScanReport {
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soil: Option<SoilReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fire: Option<FireReport>,
}

impl ScanReport {
    pub fn new(input: &Path) -> Self {
        Self {
            input: input.to_string_lossy().to_string(),
            soil: None,
            fire: None,
        }
    }

    /// The two plain-text result lines
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(soil) = &self.soil {
            lines.push(format!("Deforestation area: {} pixels", soil.total_area_pixels));
        }
        if let Some(fire) = &self.fire {
            lines.push(format!("Fire hotspots: {}", fire.hotspot_count));
        }
        lines
    }

    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
