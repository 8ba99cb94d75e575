//! Edge modifier curves.
//!
//! A modifier shapes the elevation profile along one tile edge. Every curve
//! takes the elevations at the two corners the edge joins (`first` at
//! `x = -5`, `second` at `x = +5`) and returns the height at `x`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TerrainError;

/// Minimum rise of a full hill apex (or depth of a full dip) above the
/// higher (below the lower) corner.
const FULL_CURVE_MIN_MARGIN: f64 = 4.0;

/// Shape of the elevation profile along a tile edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModifierShape {
    /// Straight ramp between the corners
    #[default]
    Flat,
    /// Parabolic bump peaking above both corners
    FullHill,
    /// Parabolic valley dipping below both corners
    FullDip,
    /// Half parabola, vertex at the higher corner
    HalfHill,
    /// Half parabola, vertex at the lower corner
    HalfDip,
    /// Step at the edge midpoint
    Cliff,
}

impl ModifierShape {
    pub const ALL: [ModifierShape; 6] = [
        ModifierShape::Flat,
        ModifierShape::FullHill,
        ModifierShape::FullDip,
        ModifierShape::HalfHill,
        ModifierShape::HalfDip,
        ModifierShape::Cliff,
    ];

    /// Evaluate the curve for this shape.
    #[inline]
    pub fn apply(self, first: f32, second: f32, x: f32) -> f32 {
        modifier(self, first, second, x)
    }
}

impl fmt::Display for ModifierShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::FullHill => write!(f, "full-hill"),
            Self::FullDip => write!(f, "full-dip"),
            Self::HalfHill => write!(f, "half-hill"),
            Self::HalfDip => write!(f, "half-dip"),
            Self::Cliff => write!(f, "cliff"),
        }
    }
}

impl FromStr for ModifierShape {
    type Err = TerrainError;

    /// Accepts `full-hill`, `full_hill`, `FullHill` and similar spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "flat" => Ok(Self::Flat),
            "fullhill" => Ok(Self::FullHill),
            "fulldip" => Ok(Self::FullDip),
            "halfhill" => Ok(Self::HalfHill),
            "halfdip" => Ok(Self::HalfDip),
            "cliff" => Ok(Self::Cliff),
            _ => Err(TerrainError::InvalidShape(s.to_string())),
        }
    }
}

/// Evaluate the modifier curve `shape` joining `first` and `second` at `x`.
pub fn modifier(shape: ModifierShape, first: f32, second: f32, x: f32) -> f32 {
    match shape {
        ModifierShape::Flat => flat(first, second, x),
        ModifierShape::FullHill => full_hill(first, second, x),
        ModifierShape::FullDip => full_dip(first, second, x),
        ModifierShape::HalfHill => half_hill(first, second, x),
        ModifierShape::HalfDip => half_dip(first, second, x),
        ModifierShape::Cliff => cliff(first, second, x),
    }
}

/// Linear ramp from `first` to `second`.
pub fn flat(first: f32, second: f32, x: f32) -> f32 {
    let m = (second - first) / 10.0;
    let b = (first + second) / 2.0;
    m * x + b
}

pub fn full_hill(first: f32, second: f32, x: f32) -> f32 {
    let (first, second) = (first as f64, second as f64);
    let k = first.max(second) + full_curve_margin(first, second);
    parabola_through_corners(first, second, k, x as f64) as f32
}

pub fn full_dip(first: f32, second: f32, x: f32) -> f32 {
    let (first, second) = (first as f64, second as f64);
    let k = first.min(second) - full_curve_margin(first, second);
    parabola_through_corners(first, second, k, x as f64) as f32
}

pub fn half_hill(first: f32, second: f32, x: f32) -> f32 {
    if first == second {
        return first;
    }

    let k = first.max(second);
    let h = if k == first { -5.0 } else { 5.0 };
    let a = (first.min(second) - k) / 100.0;

    a * (x - h) * (x - h) + k
}

pub fn half_dip(first: f32, second: f32, x: f32) -> f32 {
    if first == second {
        return first;
    }

    let k = first.min(second);
    let h = if k == first { -5.0 } else { 5.0 };
    let a = (first.max(second) - k) / 100.0;

    a * (x - h) * (x - h) + k
}

/// Step function; the midpoint takes the average of both sides.
pub fn cliff(first: f32, second: f32, x: f32) -> f32 {
    if x < 0.0 {
        first
    } else if x > 0.0 {
        second
    } else {
        (first + second) / 2.0
    }
}

fn full_curve_margin(first: f64, second: f64) -> f64 {
    FULL_CURVE_MIN_MARGIN.max(((first - second) / 4.0).abs())
}

/// Parabola `a(x - h)^2 + k` through `(-5, first)` and `(5, second)` with
/// apex elevation `k`.
///
/// `k` sits at least `FULL_CURVE_MIN_MARGIN` beyond both corners, so the
/// ratio under the root is strictly positive and `h` stays inside
/// `(-5, 5)`. Equal corners give `r = 1` and a symmetric curve. Evaluated
/// in `f64`: in `f32` the margin is lost once corners pass about 2^26.
fn parabola_through_corners(first: f64, second: f64, k: f64, x: f64) -> f64 {
    let r = ((second - k) / (first - k)).sqrt();
    let h = (5.0 - 5.0 * r) / (r + 1.0);
    let a = (second - k) / (25.0 - 10.0 * h + h * h);

    a * (x - h) * (x - h) + k
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const EPS: f32 = 1e-3;

    fn random_pairs(count: usize) -> Vec<(f32, f32)> {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut pairs: Vec<(f32, f32)> = (0..count)
            .map(|_| (rng.gen_range(-60..=60) as f32, rng.gen_range(-60..=60) as f32))
            .collect();
        pairs.push((0.0, 0.0));
        pairs.push((3.0, 3.0));
        pairs.push((-8.0, 12.0));
        pairs
    }

    #[test]
    fn test_every_shape_meets_both_corners() {
        for shape in ModifierShape::ALL {
            for (first, second) in random_pairs(200) {
                let start = modifier(shape, first, second, -5.0);
                let end = modifier(shape, first, second, 5.0);
                assert!((start - first).abs() < EPS, "{} at -5: {} vs {}", shape, start, first);
                assert!((end - second).abs() < EPS, "{} at 5: {} vs {}", shape, end, second);
            }
        }
    }

    #[test]
    fn test_cliff_midpoint_is_average() {
        assert_eq!(cliff(2.0, 6.0, 0.0), 4.0);
        assert_eq!(cliff(2.0, 6.0, -0.01), 2.0);
        assert_eq!(cliff(2.0, 6.0, 0.01), 6.0);
        assert_eq!(cliff(2.0, 6.0, -5.0), 2.0);
        assert_eq!(cliff(2.0, 6.0, 5.0), 6.0);
    }

    #[test]
    fn test_flat_is_linear() {
        let (first, second) = (-3.0, 9.0);
        let slope = (second - first) / 10.0;
        let samples = [-5.0, -2.5, -1.0, 0.0, 0.5, 3.0, 5.0];
        for &x1 in &samples {
            for &x2 in &samples {
                if x1 < x2 {
                    let rise = flat(first, second, x2) - flat(first, second, x1);
                    assert!((rise - slope * (x2 - x1)).abs() < 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_half_shapes_constant_when_corners_equal() {
        for x in [-5.0, -1.5, 0.0, 2.0, 5.0] {
            assert_eq!(half_hill(7.0, 7.0, x), 7.0);
            assert_eq!(half_dip(-2.0, -2.0, x), -2.0);
        }
    }

    #[test]
    fn test_half_hill_vertex_at_higher_corner() {
        // Rising edge: vertex at +5, curve stays at or below the high corner
        for x in [-5.0, -2.0, 0.0, 2.0, 5.0] {
            let v = half_hill(0.0, 10.0, x);
            assert!(v <= 10.0 + EPS);
            assert!(v >= flat(0.0, 10.0, x) - EPS, "half hill should bulge above the ramp");
        }
        let v = half_dip(0.0, 10.0, 0.0);
        assert!(v < flat(0.0, 10.0, 0.0), "half dip should sag below the ramp");
    }

    #[test]
    fn test_full_hill_rises_above_both_corners() {
        // Equal corners: apex sits the minimum margin above them at the midpoint
        assert!((full_hill(3.0, 3.0, 0.0) - 7.0).abs() < EPS);
        assert!((full_dip(3.0, 3.0, 0.0) - (-1.0)).abs() < EPS);

        for (first, second) in random_pairs(100) {
            let peak = (-50..=50)
                .map(|i| full_hill(first, second, i as f32 / 10.0))
                .fold(f32::MIN, f32::max);
            assert!(peak > first.max(second));

            let trough = (-50..=50)
                .map(|i| full_dip(first, second, i as f32 / 10.0))
                .fold(f32::MAX, f32::min);
            assert!(trough < first.min(second));
        }
    }

    #[test]
    fn test_full_curve_margin_grows_with_slope() {
        // |f - s| / 4 = 10 dominates the minimum margin of 4
        let peak = (-50..=50)
            .map(|i| full_hill(0.0, 40.0, i as f32 / 10.0))
            .fold(f32::MIN, f32::max);
        assert!((peak - 50.0).abs() < 0.1, "peak {}", peak);
    }

    #[test]
    fn test_full_curves_stay_finite_for_extreme_corners() {
        let max = i32::MAX as f32;
        let min = i32::MIN as f32;
        let pairs = [(1e8, 1e8), (max, max), (min, min), (min, max), (max, min), (max, max - 128.0)];
        for (first, second) in pairs {
            for shape in [ModifierShape::FullHill, ModifierShape::FullDip] {
                for i in -10..=10 {
                    let v = modifier(shape, first, second, i as f32 / 2.0);
                    assert!(v.is_finite(), "{} ({}, {}) at {}", shape, first, second, i);
                }
                let tol = first.abs().max(second.abs()) * 1e-6;
                assert!((modifier(shape, first, second, -5.0) - first).abs() <= tol);
                assert!((modifier(shape, first, second, 5.0) - second).abs() <= tol);
            }
        }
        assert!(full_hill(1e8, 1e8, 0.0) >= 1e8);
        assert!(full_dip(1e8, 1e8, 0.0) <= 1e8);
    }

    #[test]
    fn test_shape_parsing() {
        assert_eq!("full-hill".parse::<ModifierShape>().unwrap(), ModifierShape::FullHill);
        assert_eq!("HalfDip".parse::<ModifierShape>().unwrap(), ModifierShape::HalfDip);
        assert_eq!("cliff".parse::<ModifierShape>().unwrap(), ModifierShape::Cliff);
        assert!("mesa".parse::<ModifierShape>().is_err());
        for shape in ModifierShape::ALL {
            assert_eq!(shape.to_string().parse::<ModifierShape>().unwrap(), shape);
        }
    }
}
