use image::RgbImage;
use crate::{
    error::{CanopyError, Result},
    traits::ImagePreprocessor,
};

/// Gaussian blur with a fixed, odd kernel width
#[derive(Debug, Clone)]
pub struct GaussianBlurPreprocessor {
    pub kernel_size: u32,
    /// Values `<= 0` derive sigma from the kernel size
    pub sigma: f32,
}

impl Default for GaussianBlurPreprocessor {
    fn default() -> Self {
        Self { kernel_size: 5, sigma: 0.0 }
    }
}

impl GaussianBlurPreprocessor {
    pub fn new(kernel_size: u32, sigma: f32) -> Self {
        Self { kernel_size, sigma }
    }

    pub fn effective_sigma(&self) -> f32 {
        if self.sigma > 0.0 {
            self.sigma
        } else {
            0.3 * ((self.kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
        }
    }

    /// Normalised 1-D kernel; applied along both axes.
    pub fn kernel(&self) -> Vec<f32> {
        let sigma = self.effective_sigma();
        let radius = (self.kernel_size / 2) as i32;
        let weights: Vec<f32> = (-radius..=radius)
            .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
            .collect();
        let sum: f32 = weights.iter().sum();
        weights.into_iter().map(|w| w / sum).collect()
    }
}

impl ImagePreprocessor for GaussianBlurPreprocessor {
    fn preprocess(&self, image: &RgbImage) -> Result<RgbImage> {
        if self.kernel_size == 0 || self.kernel_size % 2 == 0 {
            return Err(CanopyError::InvalidConfig(format!(
                "blur kernel size must be odd and positive, got {}",
                self.kernel_size
            )));
        }
        Ok(imageproc::filter::separable_filter_equal(image, &self.kernel()))
    }
}
