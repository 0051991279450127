//! Ready-made detectors built from [`Pipeline`](crate::pipeline::Pipeline) presets.

pub mod fire;
pub mod soil;

pub use fire::FireHotspotDetector;
pub use soil::SoilExposureDetector;

#[cfg(test)]
pub(crate) mod fixtures {
    use image::{Rgb, RgbImage};

    pub const OCHRE: Rgb<u8> = Rgb([150, 121, 62]);
    pub const GRAY: Rgb<u8> = Rgb([128, 128, 128]);
    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    /// 100x100 `background` with one filled square per `(x, y, side)`
    pub fn canvas(background: Rgb<u8>, squares: &[(u32, u32, u32)], color: Rgb<u8>) -> RgbImage {
        let mut image = RgbImage::from_pixel(100, 100, background);
        for &(x0, y0, side) in squares {
            for y in y0..y0 + side {
                for x in x0..x0 + side {
                    image.put_pixel(x, y, color);
                }
            }
        }
        image
    }
}
