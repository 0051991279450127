//! # Canopy
//!
//! Colour-based detection of exposed soil and fire hotspots in still images.
//!
//! Both detectors share the same shape: convert to HSV, threshold one or more
//! colour bands into a binary mask, clean the mask with 5x5 morphology, take
//! the outer boundary of each connected region, drop regions that are too
//! small, then draw a labelled box around every survivor on a copy of the
//! input.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! let image = image::open("parcel.jpg")?.to_rgb8();
//!
//! let soil = canopy::detect_soil_exposure(&image)?;
//! println!("Deforestation area: {} pixels", soil.total_area_pixels);
//!
//! let fire = canopy::detect_fire_hotspots(&image)?;
//! println!("Fire hotspots: {}", fire.hotspot_count);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust,no_run
//! use canopy::{algorithms::*, types::HsvRange, Pipeline};
//!
//! let pipeline = Pipeline::builder()
//!     .with_mask_rule(MaskRule::Range(HsvRange::hue(35, 85)))
//!     .with_opening(StructuringElement::default())
//!     .with_min_area(200)
//!     .build()?;
//!
//! let image = image::open("field.png")?.to_rgb8();
//! let output = pipeline.process(&image)?;
//! println!("{} green regions", output.regions.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod config;
pub mod algorithms;
pub mod pipeline;
pub mod detectors;
pub mod manager;

// Re-exports for convenience
pub use error::{CanopyError, Result};
pub use types::{BoundingBox, FireHotspots, HsvImage, HsvRange, Region, SoilExposure};
pub use traits::*;
pub use config::{AnnotationConfig, CanopyConfig, FireConfig, SoilConfig};
pub use pipeline::{builder::PipelineBuilder, Pipeline, PipelineOutput};
pub use detectors::{FireHotspotDetector, SoilExposureDetector};
pub use manager::{ScanCommand, ScanManager, ScanOutcome};

use image::RgbImage;

/// Outline exposed soil using the default thresholds (yellow boxes).
pub fn detect_soil_exposure(image: &RgbImage) -> Result<SoilExposure> {
    SoilExposureDetector::new(&SoilConfig::default(), &AnnotationConfig::default())?.detect(image)
}

/// Outline fire hotspots using the default thresholds (red boxes).
pub fn detect_fire_hotspots(image: &RgbImage) -> Result<FireHotspots> {
    FireHotspotDetector::new(&FireConfig::default(), &AnnotationConfig::default())?.detect(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn create_test_image() -> RgbImage {
        let mut img = RgbImage::from_pixel(100, 100, Rgb([128, 128, 128]));
        for y in 20..50 {
            for x in 20..50 {
                img.put_pixel(x, y, Rgb([150, 121, 62]));
            }
        }
        for y in 60..90 {
            for x in 60..90 {
                let inside = (70..78).contains(&x) && (70..78).contains(&y);
                let color = if inside { [255, 255, 255] } else { [0, 0, 0] };
                img.put_pixel(x, y, Rgb(color));
            }
        }
        img
    }

    #[test]
    fn test_entry_points_on_mixed_scene() {
        let image = create_test_image();

        let soil = detect_soil_exposure(&image).expect("Should detect soil");
        assert_eq!(soil.total_area_pixels, 900);
        assert_eq!(soil.annotated_image.dimensions(), (100, 100));

        let fire = detect_fire_hotspots(&image).expect("Should detect hotspots");
        assert_eq!(fire.hotspot_count, 1);
        assert_eq!(fire.annotated_image.dimensions(), (100, 100));
    }

    #[test]
    fn test_entry_points_leave_input_untouched() {
        let image = create_test_image();
        let copy = image.clone();
        detect_soil_exposure(&image).unwrap();
        detect_fire_hotspots(&image).unwrap();
        assert_eq!(image, copy);
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let empty = RgbImage::new(0, 0);
        assert!(detect_soil_exposure(&empty).is_err());
        assert!(detect_fire_hotspots(&empty).is_err());
    }

    #[test]
    fn test_degenerate_image_shapes() {
        for (width, height) in [(1, 1), (1, 9), (9, 1)] {
            for color in [[128, 128, 128], [150, 121, 62], [255, 255, 255]] {
                let image = RgbImage::from_pixel(width, height, Rgb(color));

                let soil = detect_soil_exposure(&image).unwrap();
                assert_eq!(soil.annotated_image.dimensions(), (width, height));
                assert!(soil.total_area_pixels <= (width * height) as u64);

                let fire = detect_fire_hotspots(&image).unwrap();
                assert_eq!(fire.annotated_image.dimensions(), (width, height));
                assert_eq!(fire.hotspot_count, 0);
            }
        }
    }

    #[test]
    fn test_results_scale_with_image_bounds() {
        let image = RgbImage::from_pixel(40, 30, Rgb([150, 121, 62]));
        let soil = detect_soil_exposure(&image).unwrap();
        assert!(soil.total_area_pixels <= 40 * 30);
        assert_eq!(soil.regions.len(), 1);
    }
}
