use geo_types::{Coord, LineString, Polygon};
use image::{ImageBuffer, Rgb, RgbImage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{CanopyError, Result};

/// Exclusive upper bound of the half-circle hue scale.
pub const HUE_SCALE: u8 = 180;

/// An image in Hue-Saturation-Value space.
///
/// Hue uses the half-circle convention (`0..180`), saturation and value span
/// the full byte range. The buffer is derived from an RGB image and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct HsvImage(ImageBuffer<Rgb<u8>, Vec<u8>>);

impl HsvImage {
    /// Build an HSV image by evaluating `f` at every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> [u8; 3],
    {
        Self(ImageBuffer::from_fn(width, height, |x, y| Rgb(f(x, y))))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    /// The `[hue, saturation, value]` triple at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        self.0.get_pixel(x, y).0
    }

    /// Iterate over `(x, y, [h, s, v])` in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (u32, u32, [u8; 3])> + '_ {
        self.0.enumerate_pixels().map(|(x, y, p)| (x, y, p.0))
    }
}

/// Inclusive per-channel bound on an HSV pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HsvRange {
    /// Lower bound `[h, s, v]`, inclusive.
    pub lower: [u8; 3],
    /// Upper bound `[h, s, v]`, inclusive.
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// A hue band accepting any saturation and value.
    pub const fn hue(min: u8, max: u8) -> Self {
        Self::new([min, 0, 0], [max, u8::MAX, u8::MAX])
    }

    /// Any hue and saturation with value at or above `min`.
    pub const fn value_at_least(min: u8) -> Self {
        Self::new([0, 0, min], [HUE_SCALE, u8::MAX, u8::MAX])
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }

    pub fn validate(&self) -> Result<()> {
        if (0..3).any(|c| self.lower[c] > self.upper[c]) {
            return Err(CanopyError::InvalidConfig(format!(
                "range lower bound {:?} exceeds upper bound {:?}",
                self.lower, self.upper
            )));
        }
        Ok(())
    }
}

/// Axis-aligned box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn contains(&self, [x, y]: [u32; 2]) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn to_rect(&self) -> imageproc::rect::Rect {
        imageproc::rect::Rect::at(self.x as i32, self.y as i32).of_size(self.width, self.height)
    }
}

/// An external connected component of a binary mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Ordered outer boundary, `[x, y]` pixel coordinates
    pub contour: Vec<[u32; 2]>,
    /// Filled area in pixels (component plus enclosed holes)
    pub area: u64,
    pub bounding_box: BoundingBox,
}

impl Region {
    /// Convert the contour to a geo-types polygon for geometric measurements
    pub fn to_geo_polygon(&self) -> Polygon<f64> {
        let coords: Vec<Coord<f64>> = self
            .contour
            .iter()
            .map(|&[x, y]| Coord {
                x: x as f64,
                y: y as f64,
            })
            .collect();

        Polygon::new(LineString::new(coords), vec![])
    }

    /// Area enclosed by the contour polygon through pixel centres.
    ///
    /// Always smaller than [`Region::area`] for blobs wider than one pixel;
    /// filtering uses the filled pixel area, not this value.
    pub fn polygon_area(&self) -> f64 {
        use geo::Area;
        self.to_geo_polygon().unsigned_area()
    }

    /// Length of the closed contour.
    pub fn perimeter(&self) -> f64 {
        if self.contour.len() < 2 {
            return 0.0;
        }

        let closing = [self.contour[self.contour.len() - 1], self.contour[0]];
        self.contour
            .windows(2)
            .chain(std::iter::once(&closing[..]))
            .map(|pair| {
                let dx = pair[1][0] as f64 - pair[0][0] as f64;
                let dy = pair[1][1] as f64 - pair[0][1] as f64;
                (dx * dx + dy * dy).sqrt()
            })
            .sum()
    }

    pub fn centroid(&self) -> [f64; 2] {
        use geo::Centroid;
        match self.to_geo_polygon().centroid() {
            Some(centroid) => [centroid.x(), centroid.y()],
            None => {
                let b = self.bounding_box;
                [
                    b.x as f64 + (b.width as f64 - 1.0) / 2.0,
                    b.y as f64 + (b.height as f64 - 1.0) / 2.0,
                ]
            }
        }
    }
}

/// Outcome of the soil-exposure detector.
#[derive(Debug, Clone)]
pub struct SoilExposure {
    pub annotated_image: RgbImage,
    /// Sum of the kept regions' filled areas
    pub total_area_pixels: u64,
    pub regions: Vec<Region>,
}

/// Outcome of the fire-hotspot detector.
#[derive(Debug, Clone)]
pub struct FireHotspots {
    pub annotated_image: RgbImage,
    pub hotspot_count: usize,
    pub regions: Vec<Region>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_region(x: u32, y: u32, side: u32) -> Region {
        let last = side - 1;
        let mut contour = Vec::new();
        for i in 0..last {
            contour.push([x + i, y]);
        }
        for i in 0..last {
            contour.push([x + last, y + i]);
        }
        for i in 0..last {
            contour.push([x + last - i, y + last]);
        }
        for i in 0..last {
            contour.push([x, y + last - i]);
        }
        Region {
            contour,
            area: (side * side) as u64,
            bounding_box: BoundingBox { x, y, width: side, height: side },
        }
    }

    #[test]
    fn test_range_contains_is_inclusive() {
        let range = HsvRange::new([10, 40, 40], [30, 255, 255]);
        assert!(range.contains([10, 40, 40]));
        assert!(range.contains([30, 255, 255]));
        assert!(!range.contains([9, 200, 200]));
        assert!(!range.contains([20, 39, 200]));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let range = HsvRange::new([30, 0, 0], [10, 255, 255]);
        assert!(matches!(range.validate(), Err(CanopyError::InvalidConfig(_))));
    }

    #[test]
    fn test_region_geometry() {
        let region = square_region(10, 20, 5);
        assert!(region.contour.iter().all(|&p| region.bounding_box.contains(p)));
        assert!((region.polygon_area() - 16.0).abs() < 1e-9);
        assert!((region.perimeter() - 16.0).abs() < 1e-9);

        let [cx, cy] = region.centroid();
        assert!((cx - 12.0).abs() < 1e-9);
        assert!((cy - 22.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounding_box_area_and_rect() {
        let b = BoundingBox { x: 7, y: 3, width: 12, height: 5 };
        assert_eq!(b.area(), 60);

        let rect = b.to_rect();
        assert_eq!((rect.left(), rect.top()), (7, 3));
        assert_eq!((rect.right(), rect.bottom()), (18, 7));
    }

    #[test]
    fn test_single_pixel_region_falls_back_to_box_centre() {
        let region = Region {
            contour: vec![[3, 4]],
            area: 1,
            bounding_box: BoundingBox { x: 3, y: 4, width: 1, height: 1 },
        };
        assert_eq!(region.perimeter(), 0.0);
        assert_eq!(region.polygon_area(), 0.0);
        assert_eq!(region.centroid(), [3.0, 4.0]);
    }
}
