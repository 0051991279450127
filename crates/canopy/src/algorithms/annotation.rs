use std::fmt;

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_hollow_rect_mut, draw_text_mut, text_size},
    rect::Rect,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    config::AnnotationConfig,
    error::{CanopyError, Result},
    types::Region,
};

/// DejaVu Sans Mono Bold, used for region labels unless replaced.
pub const LABEL_FONT: &[u8] = include_bytes!("../../assets/DejaVuSansMono-Bold.ttf");

/// Colour and caption drawn around each accepted region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnnotationStyle {
    /// `[r, g, b]`
    pub color: [u8; 3],
    pub label: String,
}

/// Burns bounding boxes and labels into copies of an image.
#[derive(Clone)]
pub struct Annotator {
    font: FontArc,
    stroke_width: u32,
    label_scale: f32,
    label_offset: u32,
}

impl Annotator {
    /// Create an annotator using the embedded label font
    pub fn new(config: &AnnotationConfig) -> Result<Self> {
        config.validate()?;
        let font = FontArc::try_from_slice(LABEL_FONT)
            .map_err(|e| CanopyError::Font(e.to_string()))?;
        Ok(Self {
            font,
            stroke_width: config.stroke_width,
            label_scale: config.label_scale,
            label_offset: config.label_offset,
        })
    }

    /// Replace the label font with a TrueType/OpenType font loaded from memory
    pub fn with_font_bytes(mut self, bytes: Vec<u8>) -> Result<Self> {
        self.font = FontArc::try_from_vec(bytes).map_err(|e| CanopyError::Font(e.to_string()))?;
        Ok(self)
    }

    /// Return a copy of `image` with one box and label per region.
    pub fn draw_regions(&self, image: &RgbImage, regions: &[Region], style: &AnnotationStyle) -> RgbImage {
        let mut canvas = image.clone();
        let color = Rgb(style.color);
        let scale = PxScale::from(self.label_scale);
        let (_, text_height) = text_size(scale, &self.font, &style.label);

        for region in regions {
            let rect = region.bounding_box.to_rect();

            // Stroke grows outwards so the region itself stays visible
            for grow in 0..self.stroke_width {
                let outline = Rect::at(rect.left() - grow as i32, rect.top() - grow as i32)
                    .of_size(rect.width() + 2 * grow, rect.height() + 2 * grow);
                draw_hollow_rect_mut(&mut canvas, outline, color);
            }

            let label_y = rect.top() - self.label_offset as i32 - text_height as i32;
            draw_text_mut(
                &mut canvas,
                color,
                rect.left(),
                label_y.max(0),
                scale,
                &self.font,
                &style.label,
            );
        }

        canvas
    }
}

impl fmt::Debug for Annotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotator")
            .field("stroke_width", &self.stroke_width)
            .field("label_scale", &self.label_scale)
            .field("label_offset", &self.label_offset)
            .finish_non_exhaustive()
    }
}
