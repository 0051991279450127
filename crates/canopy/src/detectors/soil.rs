use image::RgbImage;
use tracing::{info, instrument};

use crate::{
    algorithms::{AnnotationStyle, Annotator},
    config::{AnnotationConfig, SoilConfig},
    error::Result,
    pipeline::{builder::PipelineBuilder, Pipeline},
    traits::Detector,
    types::SoilExposure,
};

/// Finds large patches of bare soil and reports their combined area.
pub struct SoilExposureDetector {
    pipeline: Pipeline,
    annotator: Annotator,
    style: AnnotationStyle,
}

impl SoilExposureDetector {
    pub fn new(config: &SoilConfig, annotation: &AnnotationConfig) -> Result<Self> {
        Ok(Self {
            pipeline: PipelineBuilder::build_soil(config)?,
            annotator: Annotator::new(annotation)?,
            style: config.style.clone(),
        })
    }

    /// Swap the annotator, e.g. to use a different label font
    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

impl Detector for SoilExposureDetector {
    type Output = SoilExposure;

    fn name(&self) -> &'static str {
        "soil_exposure"
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn detect(&self, image: &RgbImage) -> Result<SoilExposure> {
        let output = self.pipeline.process(image)?;
        let total_area_pixels = output.total_area();
        let annotated_image = self.annotator.draw_regions(image, &output.regions, &self.style);

        info!(
            regions = output.regions.len(),
            rejected = output.rejected,
            total_area_pixels,
            "soil exposure detected"
        );

        Ok(SoilExposure {
            annotated_image,
            total_area_pixels,
            regions: output.regions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::fixtures::{canvas, GRAY, OCHRE};
    use image::Rgb;

    fn detector() -> SoilExposureDetector {
        SoilExposureDetector::new(&SoilConfig::default(), &AnnotationConfig::default()).unwrap()
    }

    #[test]
    fn test_uniform_gray_has_no_soil() {
        let image = canvas(GRAY, &[], GRAY);
        let result = detector().detect(&image).unwrap();
        assert_eq!(result.total_area_pixels, 0);
        assert!(result.regions.is_empty());
        assert_eq!(result.annotated_image, image);
    }

    #[test]
    fn test_large_ochre_square_is_reported() {
        let image = canvas(GRAY, &[(20, 20, 30)], OCHRE);
        let result = detector().detect(&image).unwrap();

        assert_eq!(result.regions.len(), 1);
        assert_eq!(result.total_area_pixels, 900);
        assert_eq!(result.regions[0].bounding_box.x, 20);
        assert_eq!(result.regions[0].bounding_box.width, 30);
        assert_eq!(result.annotated_image.get_pixel(20, 20), &Rgb([255, 255, 0]));
        assert_eq!(image.get_pixel(20, 20), &OCHRE);
    }

    #[test]
    fn test_small_ochre_square_is_filtered() {
        let image = canvas(GRAY, &[(20, 20, 10)], OCHRE);
        let result = detector().detect(&image).unwrap();
        assert_eq!(result.total_area_pixels, 0);
        assert!(result.regions.is_empty());
    }

    #[test]
    fn test_detection_is_repeatable() {
        let image = canvas(GRAY, &[(5, 5, 30), (60, 55, 25)], OCHRE);
        let detector = detector();
        let first = detector.detect(&image).unwrap();
        let second = detector.detect(&image).unwrap();

        assert_eq!(first.total_area_pixels, second.total_area_pixels);
        assert_eq!(first.regions, second.regions);
        assert_eq!(first.annotated_image, second.annotated_image);
        assert_eq!(first.annotated_image.dimensions(), image.dimensions());
        assert!(first.total_area_pixels <= 100 * 100);
    }

    #[test]
    fn test_configurable_min_area() {
        let config = SoilConfig {
            min_area: 50,
            ..SoilConfig::default()
        };
        let detector = SoilExposureDetector::new(&config, &AnnotationConfig::default()).unwrap();
        let result = detector.detect(&canvas(GRAY, &[(20, 20, 10)], OCHRE)).unwrap();
        assert_eq!(result.total_area_pixels, 100);
    }
}
