use crate::{
    algorithms::{
        Closing, Dilation, ExternalRegionExtractor, GaussianBlurPreprocessor, MaskRule, Opening,
        StructuringElement,
    },
    config::{FireConfig, SoilConfig},
    error::{CanopyError, Result},
    pipeline::Pipeline,
    traits::{ImagePreprocessor, MaskStage, RegionExtractor},
};

/// Builder for creating detection pipelines with a fluent API
pub struct PipelineBuilder {
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    mask_rule: Option<MaskRule>,
    mask_stages: Vec<Box<dyn MaskStage>>,
    region_extractor: Option<Box<dyn RegionExtractor>>,
    min_area: u64,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            preprocessors: Vec::new(),
            mask_rule: None,
            mask_stages: Vec::new(),
            region_extractor: None,
            min_area: 0,
        }
    }

    /// Add an RGB preprocessor to the pipeline
    pub fn add_preprocessor<P>(mut self, preprocessor: P) -> Self
    where
        P: ImagePreprocessor + 'static,
    {
        self.preprocessors.push(Box::new(preprocessor));
        self
    }

    /// Set the HSV rule that produces the initial mask
    pub fn with_mask_rule(mut self, rule: MaskRule) -> Self {
        self.mask_rule = Some(rule);
        self
    }

    /// Add a mask clean-up stage
    pub fn add_mask_stage<S>(mut self, stage: S) -> Self
    where
        S: MaskStage + 'static,
    {
        self.mask_stages.push(Box::new(stage));
        self
    }

    /// Set the region extractor (replaces any existing one)
    pub fn set_region_extractor<E>(mut self, extractor: E) -> Self
    where
        E: RegionExtractor + 'static,
    {
        self.region_extractor = Some(Box::new(extractor));
        self
    }

    /// Keep only regions strictly larger than `min_area` pixels
    pub fn with_min_area(mut self, min_area: u64) -> Self {
        self.min_area = min_area;
        self
    }

    pub fn with_blur(self, kernel_size: u32, sigma: f32) -> Self {
        self.add_preprocessor(GaussianBlurPreprocessor::new(kernel_size, sigma))
    }

    pub fn with_opening(self, element: StructuringElement) -> Self {
        self.add_mask_stage(Opening::new(element))
    }

    pub fn with_closing(self, element: StructuringElement) -> Self {
        self.add_mask_stage(Closing::new(element))
    }

    pub fn with_dilation(self, element: StructuringElement) -> Self {
        self.add_mask_stage(Dilation::new(element))
    }

    /// Build the pipeline, defaulting to external-region extraction
    pub fn build(self) -> Result<Pipeline> {
        let mask_rule = self
            .mask_rule
            .ok_or_else(|| CanopyError::InvalidConfig("pipeline has no mask rule".to_string()))?;
        mask_rule.validate()?;

        let region_extractor = self
            .region_extractor
            .unwrap_or_else(|| Box::new(ExternalRegionExtractor));

        Ok(Pipeline::new(
            self.preprocessors,
            mask_rule,
            self.mask_stages,
            region_extractor,
            self.min_area,
        ))
    }

    /// Soil band → open → close → area filter
    pub fn build_soil(config: &SoilConfig) -> Result<Pipeline> {
        config.validate()?;
        let element = config.element()?;
        Self::new()
            .with_mask_rule(config.mask_rule())
            .with_opening(element)
            .with_closing(element)
            .with_min_area(config.min_area)
            .build()
    }

    /// Blur → (red hues ∩ bright) → open → dilate → area filter
    pub fn build_fire(config: &FireConfig) -> Result<Pipeline> {
        config.validate()?;
        let element = config.element()?;
        Self::new()
            .with_blur(config.blur_kernel_size, config.blur_sigma)
            .with_mask_rule(config.mask_rule())
            .with_opening(element)
            .with_dilation(element)
            .with_min_area(config.min_area)
            .build()
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
