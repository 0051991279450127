pub mod builder;

use image::{GrayImage, RgbImage};
use tracing::debug;

use crate::{
    algorithms::{color::{ensure_non_empty, to_hsv}, masking::{foreground_count, MaskRule}},
    error::{ensure_same_dimensions, Result},
    traits::{ImagePreprocessor, MaskStage, RegionExtractor},
    types::Region,
};

/// What a pipeline run produced before annotation
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Cleaned mask the regions were extracted from
    pub mask: GrayImage,
    /// Regions strictly larger than the minimum area
    pub regions: Vec<Region>,
    /// Number of regions dropped by the area filter
    pub rejected: usize,
}

impl PipelineOutput {
    pub fn total_area(&self) -> u64 {
        self.regions.iter().map(|r| r.area).sum()
    }
}

/// A detection pipeline: RGB preprocessing, HSV masking, mask clean-up,
/// region extraction and area filtering.
pub struct Pipeline {
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    mask_rule: MaskRule,
    mask_stages: Vec<Box<dyn MaskStage>>,
    region_extractor: Box<dyn RegionExtractor>,
    min_area: u64,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        preprocessors: Vec<Box<dyn ImagePreprocessor>>,
        mask_rule: MaskRule,
        mask_stages: Vec<Box<dyn MaskStage>>,
        region_extractor: Box<dyn RegionExtractor>,
        min_area: u64,
    ) -> Self {
        Self {
            preprocessors,
            mask_rule,
            mask_stages,
            region_extractor,
            min_area,
        }
    }

    /// Process an image through the entire pipeline
    pub fn process(&self, image: &RgbImage) -> Result<PipelineOutput> {
        ensure_non_empty(image)?;

        // Step 1: RGB preprocessing, borrowing the input when there is none
        let mut preprocessed: Option<RgbImage> = None;
        for preprocessor in &self.preprocessors {
            let source = preprocessed.as_ref().unwrap_or(image);
            preprocessed = Some(preprocessor.preprocess(source)?);
        }
        let source = preprocessed.as_ref().unwrap_or(image);
        ensure_same_dimensions(image.dimensions(), source.dimensions())?;

        // Step 2: HSV threshold mask
        let hsv = to_hsv(source)?;
        let mut mask = self.mask_rule.evaluate(&hsv)?;
        debug!(foreground = foreground_count(&mask), "threshold mask built");

        // Step 3: morphological clean-up
        for stage in &self.mask_stages {
            mask = stage.apply(&mask)?;
            ensure_same_dimensions(image.dimensions(), mask.dimensions())?;
            debug!(stage = stage.name(), foreground = foreground_count(&mask), "mask stage applied");
        }

        // Step 4: regions and area filter
        let found = self.region_extractor.find_regions(&mask)?;
        let total = found.len();
        let regions: Vec<Region> = found
            .into_iter()
            .filter(|region| region.area > self.min_area)
            .collect();
        let rejected = total - regions.len();
        debug!(kept = regions.len(), rejected, min_area = self.min_area, "regions filtered");

        Ok(PipelineOutput { mask, regions, rejected })
    }

    pub fn min_area(&self) -> u64 {
        self.min_area
    }

    pub fn mask_rule(&self) -> &MaskRule {
        &self.mask_rule
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        let stages: Vec<&str> = self.mask_stages.iter().map(|s| s.name()).collect();
        format!(
            "Pipeline: {} preprocessors, mask stages [{}], min area {}",
            self.preprocessors.len(),
            stages.join(" -> "),
            self.min_area
        )
    }
}
