use image::{GrayImage, RgbImage};
use crate::{error::Result, types::Region};

/// Trait for RGB preprocessing applied before colour conversion
pub trait ImagePreprocessor: Send + Sync {
    /// Preprocess the input image (e.g., blur)
    fn preprocess(&self, image: &RgbImage) -> Result<RgbImage>;
}

/// Trait for binary mask clean-up steps
pub trait MaskStage: Send + Sync {
    /// Short name used in pipeline descriptions and logs
    fn name(&self) -> &'static str;

    /// Produce a new mask with the same dimensions as `mask`
    fn apply(&self, mask: &GrayImage) -> Result<GrayImage>;
}

/// Trait for connected-region extraction algorithms
pub trait RegionExtractor: Send + Sync {
    /// Find the regions of a binary mask
    fn find_regions(&self, mask: &GrayImage) -> Result<Vec<Region>>;
}

/// A complete single-image detector
pub trait Detector: Send + Sync {
    type Output;

    fn name(&self) -> &'static str;

    /// Run the detector on one image, leaving the input untouched
    fn detect(&self, image: &RgbImage) -> Result<Self::Output>;
}
