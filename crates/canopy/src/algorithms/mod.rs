pub mod annotation;
pub mod color;
pub mod extraction;
pub mod masking;
pub mod morphology;
pub mod preprocessing;

pub use annotation::{AnnotationStyle, Annotator};
pub use color::{rgb_image_from_raw, rgb_to_hsv, to_hsv};
pub use extraction::{fill_holes, ExternalRegionExtractor};
pub use masking::{foreground_count, intersect, range_mask, union, MaskRule};
pub use morphology::{close, dilate, erode, open, Closing, Dilation, Erosion, Opening, StructuringElement};
pub use preprocessing::GaussianBlurPreprocessor;
