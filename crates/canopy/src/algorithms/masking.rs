use image::{GrayImage, Luma};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ensure_same_dimensions, CanopyError, Result},
    types::{HsvImage, HsvRange},
};

pub const FOREGROUND: Luma<u8> = Luma([255]);
pub const BACKGROUND: Luma<u8> = Luma([0]);

/// Foreground wherever all three channels fall inside `bound`.
pub fn range_mask(hsv: &HsvImage, bound: &HsvRange) -> GrayImage {
    let mut mask = GrayImage::new(hsv.width(), hsv.height());
    for (x, y, pixel) in hsv.enumerate() {
        if bound.contains(pixel) {
            mask.put_pixel(x, y, FOREGROUND);
        }
    }
    mask
}

/// Per-pixel logical OR.
pub fn union(a: &GrayImage, b: &GrayImage) -> Result<GrayImage> {
    combine(a, b, |p, q| p || q)
}

/// Per-pixel logical AND.
pub fn intersect(a: &GrayImage, b: &GrayImage) -> Result<GrayImage> {
    combine(a, b, |p, q| p && q)
}

fn combine<F>(a: &GrayImage, b: &GrayImage, op: F) -> Result<GrayImage>
where
    F: Fn(bool, bool) -> bool,
{
    ensure_same_dimensions(a.dimensions(), b.dimensions())?;
    Ok(GrayImage::from_fn(a.width(), a.height(), |x, y| {
        if op(a.get_pixel(x, y)[0] > 0, b.get_pixel(x, y)[0] > 0) {
            FOREGROUND
        } else {
            BACKGROUND
        }
    }))
}

pub fn foreground_count(mask: &GrayImage) -> u64 {
    mask.pixels().filter(|p| p[0] > 0).count() as u64
}

/// Declarative description of how a detector builds its binary mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaskRule {
    /// Pixels inside a single HSV range
    Range(HsvRange),
    /// Pixels accepted by any of the rules
    Union(Vec<MaskRule>),
    /// Pixels accepted by every rule
    Intersect(Vec<MaskRule>),
}

impl MaskRule {
    pub fn evaluate(&self, hsv: &HsvImage) -> Result<GrayImage> {
        match self {
            MaskRule::Range(bound) => Ok(range_mask(hsv, bound)),
            MaskRule::Union(rules) => self.fold(hsv, rules, union),
            MaskRule::Intersect(rules) => self.fold(hsv, rules, intersect),
        }
    }

    fn fold<F>(&self, hsv: &HsvImage, rules: &[MaskRule], op: F) -> Result<GrayImage>
    where
        F: Fn(&GrayImage, &GrayImage) -> Result<GrayImage>,
    {
        let (first, rest) = rules.split_first().ok_or_else(|| {
            CanopyError::InvalidConfig(format!("empty mask combination: {self:?}"))
        })?;

        let mut mask = first.evaluate(hsv)?;
        for rule in rest {
            mask = op(&mask, &rule.evaluate(hsv)?)?;
        }
        Ok(mask)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            MaskRule::Range(bound) => bound.validate(),
            MaskRule::Union(rules) | MaskRule::Intersect(rules) => {
                if rules.is_empty() {
                    return Err(CanopyError::InvalidConfig(format!(
                        "empty mask combination: {self:?}"
                    )));
                }
                rules.iter().try_for_each(MaskRule::validate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hsv_row(pixels: &[[u8; 3]]) -> HsvImage {
        HsvImage::from_fn(pixels.len() as u32, 1, |x, _| pixels[x as usize])
    }

    fn mask_row(bits: &[bool]) -> GrayImage {
        GrayImage::from_fn(bits.len() as u32, 1, |x, _| {
            if bits[x as usize] { FOREGROUND } else { BACKGROUND }
        })
    }

    fn bits(mask: &GrayImage) -> Vec<bool> {
        mask.pixels().map(|p| p[0] > 0).collect()
    }

    #[test]
    fn test_range_mask() {
        let hsv = hsv_row(&[[20, 150, 150], [5, 150, 150], [20, 10, 150], [30, 255, 40]]);
        let mask = range_mask(&hsv, &HsvRange::new([10, 40, 40], [30, 255, 255]));
        assert_eq!(bits(&mask), vec![true, false, false, true]);
    }

    #[test]
    fn test_union_and_intersect() {
        let a = mask_row(&[true, true, false, false]);
        let b = mask_row(&[true, false, true, false]);
        assert_eq!(bits(&union(&a, &b).unwrap()), vec![true, true, true, false]);
        assert_eq!(bits(&intersect(&a, &b).unwrap()), vec![true, false, false, false]);
    }

    #[test]
    fn test_mismatched_masks_fail() {
        let a = GrayImage::new(4, 1);
        let b = GrayImage::new(4, 2);
        assert!(matches!(
            union(&a, &b),
            Err(CanopyError::DimensionMismatch { expected: (4, 1), found: (4, 2) })
        ));
        assert!(intersect(&a, &b).is_err());
    }

    #[test]
    fn test_rule_evaluation() {
        let rule = MaskRule::Intersect(vec![
            MaskRule::Union(vec![
                MaskRule::Range(HsvRange::hue(0, 20)),
                MaskRule::Range(HsvRange::hue(170, 180)),
            ]),
            MaskRule::Range(HsvRange::value_at_least(215)),
        ]);
        let hsv = hsv_row(&[[2, 0, 255], [178, 0, 255], [90, 0, 255], [2, 0, 100]]);
        let mask = rule.evaluate(&hsv).unwrap();
        assert_eq!(bits(&mask), vec![true, true, false, false]);
        assert_eq!(foreground_count(&mask), 2);
    }

    #[test]
    fn test_empty_combination_is_invalid() {
        let rule = MaskRule::Union(vec![]);
        assert!(rule.validate().is_err());
        assert!(rule.evaluate(&hsv_row(&[[0, 0, 0]])).is_err());
    }
}
