use image::RgbImage;
use tracing::{info, instrument};

use crate::{
    algorithms::{AnnotationStyle, Annotator},
    config::{AnnotationConfig, FireConfig},
    error::Result,
    pipeline::{builder::PipelineBuilder, Pipeline},
    traits::Detector,
    types::FireHotspots,
};

/// Counts small, very bright red-to-yellow blobs.
pub struct FireHotspotDetector {
    pipeline: Pipeline,
    annotator: Annotator,
    style: AnnotationStyle,
}

impl FireHotspotDetector {
    pub fn new(config: &FireConfig, annotation: &AnnotationConfig) -> Result<Self> {
        Ok(Self {
            pipeline: PipelineBuilder::build_fire(config)?,
            annotator: Annotator::new(annotation)?,
            style: config.style.clone(),
        })
    }

    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

impl Detector for FireHotspotDetector {
    type Output = FireHotspots;

    fn name(&self) -> &'static str {
        "fire_hotspots"
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn detect(&self, image: &RgbImage) -> Result<FireHotspots> {
        let output = self.pipeline.process(image)?;
        let hotspot_count = output.regions.len();
        let annotated_image = self.annotator.draw_regions(image, &output.regions, &self.style);

        info!(hotspot_count, rejected = output.rejected, "fire hotspots detected");

        Ok(FireHotspots {
            annotated_image,
            hotspot_count,
            regions: output.regions,
        })
    }
}
