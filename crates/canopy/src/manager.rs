use std::{path::Path, sync::Arc};

use image::RgbImage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::{
    config::CanopyConfig,
    detectors::{FireHotspotDetector, SoilExposureDetector},
    error::{CanopyError, Result},
    traits::Detector,
    types::{FireHotspots, SoilExposure},
};

#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq
)]
#[serde(tag = "type")]
#[strum(serialize_all = "snake_case")]
pub enum ScanCommand {
    /// Outline exposed soil and sum its area
    #[serde(rename = "detect_soil_exposure")]
    DetectSoilExposure,

    /// Outline and count fire hotspots
    #[serde(rename = "detect_fire_hotspots")]
    DetectFireHotspots,
}

impl ScanCommand {
    /// Get the JSON schema for all commands
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ScanCommand)
    }

    /// Get a list of all available command names
    pub fn command_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::DetectSoilExposure => "Find bare-soil regions above the area threshold and report their total pixel area",
            Self::DetectFireHotspots => "Find bright red-to-yellow blobs above the area threshold and report how many there are",
        }
    }
}

/// Result of [`ScanManager::execute`]
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    SoilExposure(SoilExposure),
    FireHotspots(FireHotspots),
}

/// Holds one image and both detectors so commands can be replayed against it.
#[derive(Clone)]
pub struct ScanManager {
    image: Option<RgbImage>,
    soil: Arc<SoilExposureDetector>,
    fire: Arc<FireHotspotDetector>,
}

impl ScanManager {
    pub fn new() -> Result<Self> {
        Self::with_config(&CanopyConfig::default())
    }

    /// Create a manager whose detectors use `config`
    pub fn with_config(config: &CanopyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            image: None,
            soil: Arc::new(SoilExposureDetector::new(&config.soil, &config.annotation)?),
            fire: Arc::new(FireHotspotDetector::new(&config.fire, &config.annotation)?),
        })
    }

    /// Load an image from file, dropping any alpha channel
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let img = image::open(path)?;
        self.image = Some(img.to_rgb8());
        Ok(())
    }

    /// Load an encoded image from memory
    pub fn load_image_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let img = image::load_from_memory(bytes)?;
        self.image = Some(img.to_rgb8());
        Ok(())
    }

    pub fn set_image(&mut self, image: RgbImage) {
        self.image = Some(image);
    }

    pub fn image(&self) -> Option<&RgbImage> {
        self.image.as_ref()
    }

    pub fn soil_detector(&self) -> Arc<SoilExposureDetector> {
        Arc::clone(&self.soil)
    }

    pub fn fire_detector(&self) -> Arc<FireHotspotDetector> {
        Arc::clone(&self.fire)
    }

    pub fn execute(&self, command: ScanCommand) -> Result<ScanOutcome> {
        let image = self.image.as_ref().ok_or(CanopyError::NoImageLoaded)?;

        match command {
            ScanCommand::DetectSoilExposure => self.soil.detect(image).map(ScanOutcome::SoilExposure),
            ScanCommand::DetectFireHotspots => self.fire.detect(image).map(ScanOutcome::FireHotspots),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb};
    use std::{io::Cursor, str::FromStr};

    #[test]
    fn test_execute_without_image_fails() {
        let manager = ScanManager::new().unwrap();
        assert!(matches!(
            manager.execute(ScanCommand::DetectSoilExposure),
            Err(CanopyError::NoImageLoaded)
        ));
    }

    #[test]
    fn test_command_names_and_parsing() {
        assert_eq!(
            ScanCommand::command_names(),
            &["detect_soil_exposure", "detect_fire_hotspots"]
        );
        assert_eq!(
            ScanCommand::from_str("detect_fire_hotspots").unwrap(),
            ScanCommand::DetectFireHotspots
        );
        assert_eq!(ScanCommand::DetectSoilExposure.to_string(), "detect_soil_exposure");

        let parsed: ScanCommand = serde_json::from_str(r#"{"type":"detect_soil_exposure"}"#).unwrap();
        assert_eq!(parsed, ScanCommand::DetectSoilExposure);
    }

    #[test]
    fn test_every_command_is_described_and_in_the_schema() {
        use strum::IntoEnumIterator;

        let schema = serde_json::to_string(&ScanCommand::schema()).unwrap();
        for command in ScanCommand::iter() {
            assert!(!command.description().is_empty());
            assert!(schema.contains(&command.to_string()));
        }
    }

    #[test]
    fn test_loads_png_bytes_and_drops_alpha() {
        let rgba = image::RgbaImage::from_pixel(12, 8, image::Rgba([255, 255, 255, 10]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(rgba)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let mut manager = ScanManager::new().unwrap();
        manager.load_image_from_bytes(&bytes).unwrap();
        let image = manager.image().unwrap();
        assert_eq!(image.dimensions(), (12, 8));
        assert_eq!(image.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_garbage_bytes_are_a_load_error() {
        let mut manager = ScanManager::new().unwrap();
        assert!(matches!(
            manager.load_image_from_bytes(b"not an image"),
            Err(CanopyError::ImageLoad(_))
        ));
    }

    #[test]
    fn test_both_commands_run_on_the_same_image() {
        let mut manager = ScanManager::new().unwrap();
        manager.set_image(RgbImage::from_pixel(64, 64, Rgb([128, 128, 128])));

        match manager.execute(ScanCommand::DetectSoilExposure).unwrap() {
            ScanOutcome::SoilExposure(soil) => assert_eq!(soil.total_area_pixels, 0),
            other => panic!("unexpected outcome {other:?}"),
        }
        match manager.execute(ScanCommand::DetectFireHotspots).unwrap() {
            ScanOutcome::FireHotspots(fire) => assert_eq!(fire.hotspot_count, 0),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = CanopyConfig::default();
        config.annotation.stroke_width = 0;
        assert!(ScanManager::with_config(&config).is_err());
    }
}
