//! Tunable detector parameters.
//!
//! Defaults reproduce the reference thresholds. They were chosen empirically
//! and may need retuning for other cameras, which is why every value is
//! exposed here rather than baked into the detectors.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    algorithms::{annotation::AnnotationStyle, masking::MaskRule, morphology::StructuringElement},
    error::{CanopyError, Result},
    types::HsvRange,
};

/// Brown, ochre and sand tones.
pub const SOIL_RANGE: HsvRange = HsvRange::new([10, 40, 40], [30, 255, 255]);
pub const SOIL_MIN_AREA: u64 = 500;

pub const LOW_RED: HsvRange = HsvRange::hue(0, 20);
/// Reds on the far side of the hue circle.
pub const HIGH_RED: HsvRange = HsvRange::hue(170, 180);
pub const FIRE_MIN_BRIGHTNESS: u8 = 215;
pub const FIRE_MIN_AREA: u64 = 30;

pub const YELLOW: [u8; 3] = [255, 255, 0];
pub const RED: [u8; 3] = [255, 0, 0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SoilConfig {
    /// HSV band considered exposed soil
    pub range: HsvRange,
    /// Side of the square structuring element used for open/close
    pub kernel_size: u32,
    /// Regions must be strictly larger than this many pixels
    pub min_area: u64,
    pub style: AnnotationStyle,
}

impl Default for SoilConfig {
    fn default() -> Self {
        Self {
            range: SOIL_RANGE,
            kernel_size: 5,
            min_area: SOIL_MIN_AREA,
            style: AnnotationStyle {
                color: YELLOW,
                label: "Desmatamento".to_string(),
            },
        }
    }
}

impl SoilConfig {
    pub fn element(&self) -> Result<StructuringElement> {
        StructuringElement::square(self.kernel_size)
    }

    pub fn mask_rule(&self) -> MaskRule {
        MaskRule::Range(self.range)
    }

    pub fn validate(&self) -> Result<()> {
        self.range.validate()?;
        self.element()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FireConfig {
    /// Side of the Gaussian kernel applied before thresholding
    pub blur_kernel_size: u32,
    /// Gaussian sigma; `0` derives it from the kernel size
    pub blur_sigma: f32,
    pub low_red: HsvRange,
    pub high_red: HsvRange,
    /// Minimum HSV value, regardless of saturation
    pub min_brightness: u8,
    /// Side of the square structuring element used for open/dilate
    pub kernel_size: u32,
    /// Regions must be strictly larger than this many pixels
    pub min_area: u64,
    pub style: AnnotationStyle,
}

impl Default for FireConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: 5,
            blur_sigma: 0.0,
            low_red: LOW_RED,
            high_red: HIGH_RED,
            min_brightness: FIRE_MIN_BRIGHTNESS,
            kernel_size: 5,
            min_area: FIRE_MIN_AREA,
            style: AnnotationStyle {
                color: RED,
                label: "Foco de Incendio".to_string(),
            },
        }
    }
}

impl FireConfig {
    pub fn element(&self) -> Result<StructuringElement> {
        StructuringElement::square(self.kernel_size)
    }

    /// Red hues at both ends of the circle.
    pub fn hue_rule(&self) -> MaskRule {
        MaskRule::Union(vec![
            MaskRule::Range(self.low_red),
            MaskRule::Range(self.high_red),
        ])
    }

    /// Reddish and very bright.
    pub fn mask_rule(&self) -> MaskRule {
        MaskRule::Intersect(vec![
            self.hue_rule(),
            MaskRule::Range(HsvRange::value_at_least(self.min_brightness)),
        ])
    }

    pub fn validate(&self) -> Result<()> {
        self.low_red.validate()?;
        self.high_red.validate()?;
        self.element()?;
        StructuringElement::square(self.blur_kernel_size).map_err(|_| {
            CanopyError::InvalidConfig(format!(
                "blur kernel size must be odd and positive, got {}",
                self.blur_kernel_size
            ))
        })?;
        if !self.blur_sigma.is_finite() || self.blur_sigma < 0.0 {
            return Err(CanopyError::InvalidConfig(format!(
                "blur sigma must be finite and non-negative, got {}",
                self.blur_sigma
            )));
        }
        Ok(())
    }
}

/// Presentation constants for annotated output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnnotationConfig {
    pub stroke_width: u32,
    /// Label height in pixels
    pub label_scale: f32,
    /// Gap between the label and the top of its box
    pub label_offset: u32,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            stroke_width: 2,
            label_scale: 18.0,
            label_offset: 10,
        }
    }
}

impl AnnotationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.stroke_width == 0 {
            return Err(CanopyError::InvalidConfig("stroke width must be positive".to_string()));
        }
        if !self.label_scale.is_finite() || self.label_scale <= 0.0 {
            return Err(CanopyError::InvalidConfig(format!(
                "label scale must be positive, got {}",
                self.label_scale
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CanopyConfig {
    pub soil: SoilConfig,
    pub fire: FireConfig,
    pub annotation: AnnotationConfig,
}

impl CanopyConfig {
    /// Get the JSON schema for configuration files
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(CanopyConfig)
    }

    pub fn validate(&self) -> Result<()> {
        self.soil.validate()?;
        self.fire.validate()?;
        self.annotation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        CanopyConfig::default().validate().expect("defaults validate");
    }

    #[test]
    fn test_even_kernels_are_rejected() {
        let mut config = CanopyConfig::default();
        config.soil.kernel_size = 4;
        assert!(config.validate().is_err());

        let mut config = CanopyConfig::default();
        config.fire.blur_kernel_size = 6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_sigma_is_rejected() {
        let mut config = CanopyConfig::default();
        config.fire.blur_sigma = -1.0;
        assert!(config.validate().is_err());
        config.fire.blur_sigma = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: CanopyConfig =
            serde_json::from_str(r#"{ "fire": { "min_brightness": 200 } }"#).unwrap();
        assert_eq!(config.fire.min_brightness, 200);
        assert_eq!(config.fire.min_area, FIRE_MIN_AREA);
        assert_eq!(config.soil, SoilConfig::default());
    }

    #[test]
    fn test_schema_lists_sections() {
        let schema = serde_json::to_value(CanopyConfig::schema()).unwrap();
        let properties = &schema["properties"];
        assert!(properties.get("soil").is_some());
        assert!(properties.get("fire").is_some());
        assert!(properties.get("annotation").is_some());
    }
}
