//! Binary morphology with a square structuring element.
//!
//! Pixels outside the image are background for every neighbourhood test, so
//! erosion shrinks regions that touch the border and dilation never pulls
//! foreground in from outside. imageproc's distance-transform morphology
//! treats the outside as foreground during erosion, hence the local passes.

use image::GrayImage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    algorithms::masking::{BACKGROUND, FOREGROUND},
    error::{CanopyError, Result},
    traits::MaskStage,
};

/// Square, all-foreground structuring element with an odd side length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StructuringElement {
    pub size: u32,
}

impl StructuringElement {
    pub fn square(size: u32) -> Result<Self> {
        let element = Self { size };
        element.validate()?;
        Ok(element)
    }

    pub fn radius(&self) -> u32 {
        self.size / 2
    }

    pub fn validate(&self) -> Result<()> {
        if self.size == 0 || self.size % 2 == 0 {
            return Err(CanopyError::InvalidConfig(format!(
                "structuring element size must be odd and positive, got {}",
                self.size
            )));
        }
        Ok(())
    }
}

impl Default for StructuringElement {
    fn default() -> Self {
        Self { size: 5 }
    }
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy)]
enum Extremum {
    /// every sample foreground
    Min,
    /// any sample foreground
    Max,
}

/// One separable pass of a square min/max filter along `axis`.
fn sweep(mask: &GrayImage, radius: u32, axis: Axis, extremum: Extremum) -> GrayImage {
    let (width, height) = mask.dimensions();
    let radius = radius as i64;

    GrayImage::from_fn(width, height, |x, y| {
        let (pos, len) = match axis {
            Axis::Horizontal => (x as i64, width as i64),
            Axis::Vertical => (y as i64, height as i64),
        };
        let sample = |i: i64| {
            if i < 0 || i >= len {
                return false;
            }
            let (sx, sy) = match axis {
                Axis::Horizontal => (i as u32, y),
                Axis::Vertical => (x, i as u32),
            };
            mask.get_pixel(sx, sy)[0] > 0
        };

        let mut window = pos - radius..=pos + radius;
        let hit = match extremum {
            Extremum::Min => window.all(sample),
            Extremum::Max => window.any(sample),
        };
        if hit { FOREGROUND } else { BACKGROUND }
    })
}

pub fn erode(mask: &GrayImage, element: StructuringElement) -> GrayImage {
    let rows = sweep(mask, element.radius(), Axis::Horizontal, Extremum::Min);
    sweep(&rows, element.radius(), Axis::Vertical, Extremum::Min)
}

pub fn dilate(mask: &GrayImage, element: StructuringElement) -> GrayImage {
    let rows = sweep(mask, element.radius(), Axis::Horizontal, Extremum::Max);
    sweep(&rows, element.radius(), Axis::Vertical, Extremum::Max)
}

/// Erosion followed by dilation: removes specks smaller than the element.
pub fn open(mask: &GrayImage, element: StructuringElement) -> GrayImage {
    dilate(&erode(mask, element), element)
}

/// Dilation followed by erosion: fills gaps narrower than the element.
pub fn close(mask: &GrayImage, element: StructuringElement) -> GrayImage {
    erode(&dilate(mask, element), element)
}

macro_rules! mask_stage {
    ($(#[$doc:meta])* $name:ident, $label:literal, $op:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name {
            pub element: StructuringElement,
        }

        impl $name {
            pub fn new(element: StructuringElement) -> Self {
                Self { element }
            }
        }

        impl MaskStage for $name {
            fn name(&self) -> &'static str {
                $label
            }

            fn apply(&self, mask: &GrayImage) -> Result<GrayImage> {
                self.element.validate()?;
                Ok($op(mask, self.element))
            }
        }
    };
}

mask_stage!(
    /// Morphological opening stage
    Opening, "open", open
);
mask_stage!(
    /// Morphological closing stage
    Closing, "close", close
);
mask_stage!(
    /// Dilation stage, merges regions closer than the element radius
    Dilation, "dilate", dilate
);
mask_stage!(Erosion, "erode", erode);
