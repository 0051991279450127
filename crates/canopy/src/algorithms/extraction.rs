use std::collections::{HashMap, HashSet};

use image::GrayImage;
use imageproc::{
    contours::{find_contours, BorderType},
    region_labelling::{connected_components, Connectivity},
};
use tracing::trace;

use crate::{
    algorithms::masking::{BACKGROUND, FOREGROUND},
    error::Result,
    traits::RegionExtractor,
    types::{BoundingBox, Region},
};

/// Extracts the outermost 8-connected components of a mask.
///
/// Holes are filled before labelling, so a component sitting inside another
/// component's hole is absorbed by its host and each region's area counts
/// every pixel enclosed by its outer boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalRegionExtractor;

impl RegionExtractor for ExternalRegionExtractor {
    fn find_regions(&self, mask: &GrayImage) -> Result<Vec<Region>> {
        // imageproc's labelling cannot handle a single pixel
        if mask.width() as u64 * mask.height() as u64 == 1 {
            return Ok(single_pixel_region(mask).into_iter().collect());
        }

        let filled = fill_holes(mask);
        let labels = connected_components(&filled, Connectivity::Eight, BACKGROUND);
        let width = filled.width() as u64;

        let mut stats: HashMap<u32, ComponentStats> = HashMap::new();
        for (x, y, label) in labels.enumerate_pixels() {
            let label = label[0];
            if label == 0 {
                continue;
            }
            stats
                .entry(label)
                .and_modify(|s| s.add(x, y))
                .or_insert_with(|| ComponentStats::new(x, y, y as u64 * width + x as u64));
        }

        let mut contours: HashMap<u32, Vec<[u32; 2]>> = HashMap::new();
        for contour in find_contours::<u32>(&filled) {
            if contour.border_type != BorderType::Outer || contour.parent.is_some() {
                continue;
            }
            let Some(start) = contour.points.first() else {
                continue;
            };
            let label = labels.get_pixel(start.x, start.y)[0];
            contours
                .entry(label)
                .or_insert_with(|| contour.points.iter().map(|p| [p.x, p.y]).collect());
        }

        let mut components: Vec<(u32, ComponentStats)> = stats.into_iter().collect();
        components.sort_by_key(|(_, s)| s.first);

        let regions: Vec<Region> = components
            .into_iter()
            .map(|(label, s)| Region {
                contour: contours
                    .remove(&label)
                    .unwrap_or_else(|| vec![[s.min_x, s.min_y]]),
                area: s.count,
                bounding_box: BoundingBox {
                    x: s.min_x,
                    y: s.min_y,
                    width: s.max_x - s.min_x + 1,
                    height: s.max_y - s.min_y + 1,
                },
            })
            .collect();

        trace!(regions = regions.len(), "extracted external regions");
        Ok(regions)
    }
}

fn single_pixel_region(mask: &GrayImage) -> Option<Region> {
    (mask.get_pixel(0, 0)[0] > 0).then(|| Region {
        contour: vec![[0, 0]],
        area: 1,
        bounding_box: BoundingBox { x: 0, y: 0, width: 1, height: 1 },
    })
}

#[derive(Debug, Clone, Copy)]
struct ComponentStats {
    /// raster index of the first pixel, for stable ordering
    first: u64,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    count: u64,
}

impl ComponentStats {
    fn new(x: u32, y: u32, first: u64) -> Self {
        Self {
            first,
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            count: 1,
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.count += 1;
    }
}

/// Set every background pixel that cannot reach the image border to foreground.
///
/// Background is 4-connected, the dual of 8-connected foreground.
pub fn fill_holes(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    if width as u64 * height as u64 <= 1 {
        return mask.clone();
    }

    let binary = GrayImage::from_fn(width, height, |x, y| {
        if mask.get_pixel(x, y)[0] > 0 {
            FOREGROUND
        } else {
            BACKGROUND
        }
    });
    // Label the background by declaring foreground to be the "background" value
    let background = connected_components(&binary, Connectivity::Four, FOREGROUND);

    let mut outside = HashSet::new();
    for x in 0..width {
        outside.insert(background.get_pixel(x, 0)[0]);
        outside.insert(background.get_pixel(x, height - 1)[0]);
    }
    for y in 0..height {
        outside.insert(background.get_pixel(0, y)[0]);
        outside.insert(background.get_pixel(width - 1, y)[0]);
    }

    GrayImage::from_fn(width, height, |x, y| {
        let label = background.get_pixel(x, y)[0];
        if label == 0 || !outside.contains(&label) {
            FOREGROUND
        } else {
            BACKGROUND
        }
    })
}
