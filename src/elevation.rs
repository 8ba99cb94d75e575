//! Per-tile elevation model.
//!
//! Four integer corner elevations and four edge modifiers define a height
//! field over the local footprint `x, z ∈ [-5, 5]`. The field is the average
//! of two sweeps: the horizontal sweep runs the left/right edge curves along
//! `z` first and feeds their results into the top/bottom curves along `x`;
//! the vertical sweep does the reverse. Each edge can pick its own shape and
//! the corners still meet.

use serde::{Deserialize, Serialize};

use crate::direction::{Corner, Edge, HALF_TILE};
use crate::modifier::ModifierShape;

/// Elevations at the four corners of a tile. Unbounded in both directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CornerElevations {
    pub top_left: i32,
    pub top_right: i32,
    pub bottom_left: i32,
    pub bottom_right: i32,
}

impl CornerElevations {
    pub fn uniform(elevation: i32) -> Self {
        Self {
            top_left: elevation,
            top_right: elevation,
            bottom_left: elevation,
            bottom_right: elevation,
        }
    }

    pub fn get(&self, corner: Corner) -> i32 {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomLeft => self.bottom_left,
            Corner::BottomRight => self.bottom_right,
        }
    }

    pub fn set(&mut self, corner: Corner, elevation: i32) {
        match corner {
            Corner::TopLeft => self.top_left = elevation,
            Corner::TopRight => self.top_right = elevation,
            Corner::BottomLeft => self.bottom_left = elevation,
            Corner::BottomRight => self.bottom_right = elevation,
        }
    }

    /// Mean of the four corners. Summed in `i64` so extreme corners cannot overflow.
    pub fn average(&self) -> f32 {
        let sum = self.top_left as i64 + self.top_right as i64 + self.bottom_left as i64 + self.bottom_right as i64;
        (sum as f64 / 4.0) as f32
    }
}

/// Shapes of the four tile edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EdgeModifiers {
    pub top: ModifierShape,
    pub left: ModifierShape,
    pub right: ModifierShape,
    pub bottom: ModifierShape,
}

impl EdgeModifiers {
    pub fn uniform(shape: ModifierShape) -> Self {
        Self {
            top: shape,
            left: shape,
            right: shape,
            bottom: shape,
        }
    }

    pub fn get(&self, edge: Edge) -> ModifierShape {
        match edge {
            Edge::Top => self.top,
            Edge::Left => self.left,
            Edge::Right => self.right,
            Edge::Bottom => self.bottom,
        }
    }

    pub fn set(&mut self, edge: Edge, shape: ModifierShape) {
        match edge {
            Edge::Top => self.top = shape,
            Edge::Left => self.left = shape,
            Edge::Right => self.right = shape,
            Edge::Bottom => self.bottom = shape,
        }
    }
}

/// Corner elevations plus edge modifiers; everything needed to sample a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeightField {
    pub elevations: CornerElevations,
    pub modifiers: EdgeModifiers,
}

impl HeightField {
    pub fn new(elevations: CornerElevations, modifiers: EdgeModifiers) -> Self {
        Self { elevations, modifiers }
    }

    /// Elevation at local `(x, z)`; `x, z ∈ [-5, 5]`.
    pub fn elevation_at(&self, x: f32, z: f32) -> f32 {
        (self.horizontal_sweep(x, z) + self.vertical_sweep(x, z)) / 2.0
    }

    /// Left/right curves along `z`, then top/bottom curves along `x` between
    /// those two results, blended by `z`.
    pub fn horizontal_sweep(&self, x: f32, z: f32) -> f32 {
        let e = &self.elevations;
        let m = &self.modifiers;

        let left = m.left.apply(e.bottom_left as f32, e.top_left as f32, z);
        let right = m.right.apply(e.bottom_right as f32, e.top_right as f32, z);
        let top = m.top.apply(left, right, x);
        let bottom = m.bottom.apply(left, right, x);

        let top_influence = (HALF_TILE + z) / 10.0;
        let bottom_influence = (HALF_TILE - z) / 10.0;

        top * top_influence + bottom * bottom_influence
    }

    /// Top/bottom curves along `x`, then left/right curves along `z` between
    /// those two results, blended by `x`.
    pub fn vertical_sweep(&self, x: f32, z: f32) -> f32 {
        let e = &self.elevations;
        let m = &self.modifiers;

        let top = m.top.apply(e.top_left as f32, e.top_right as f32, x);
        let bottom = m.bottom.apply(e.bottom_left as f32, e.bottom_right as f32, x);
        let left = m.left.apply(bottom, top, z);
        let right = m.right.apply(bottom, top, z);

        let left_influence = (HALF_TILE - x) / 10.0;
        let right_influence = (HALF_TILE + x) / 10.0;

        left * left_influence + right * right_influence
    }

    /// Profile of a single edge at parameter `t ∈ [-5, 5]`, evaluated from the
    /// two corners it joins.
    pub fn edge_profile(&self, edge: Edge, t: f32) -> f32 {
        let (first, second) = edge.corners();
        self.modifiers.get(edge).apply(
            self.elevations.get(first) as f32,
            self.elevations.get(second) as f32,
            t,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn test_flat_zero_tile_is_level() {
        let field = HeightField::default();
        for x in -5..=5 {
            for z in -5..=5 {
                assert_eq!(field.elevation_at(x as f32, z as f32), 0.0);
            }
        }
    }

    #[test]
    fn test_raised_corner_scenario() {
        let mut field = HeightField::default();
        field.elevations.top_left = 4;

        assert!((field.elevation_at(-5.0, 5.0) - 4.0).abs() < EPS);
        let centre = field.elevation_at(0.0, 0.0);
        assert!(centre > 0.0 && centre < 4.0, "centre {}", centre);
        assert!((centre - 1.0).abs() < EPS);
    }

    #[test]
    fn test_corners_reproduced_for_every_shape() {
        let elevations = CornerElevations {
            top_left: 3,
            top_right: -2,
            bottom_left: 7,
            bottom_right: 0,
        };
        for shape in ModifierShape::ALL {
            let field = HeightField::new(elevations, EdgeModifiers::uniform(shape));
            for corner in Corner::ALL {
                let (x, z) = corner.local_position();
                let value = field.elevation_at(x, z);
                let expected = elevations.get(corner) as f32;
                assert!((value - expected).abs() < EPS, "{} {}: {} vs {}", shape, corner, value, expected);
            }
        }
    }

    #[test]
    fn test_border_matches_edge_profile() {
        // Along a border the sampled field follows that edge's own curve,
        // which is what keeps neighbouring tiles seamless.
        let field = HeightField::new(
            CornerElevations { top_left: 5, top_right: 1, bottom_left: -3, bottom_right: 2 },
            EdgeModifiers {
                top: ModifierShape::FullHill,
                left: ModifierShape::HalfDip,
                right: ModifierShape::Flat,
                bottom: ModifierShape::HalfHill,
            },
        );
        for i in -5..=5 {
            let t = i as f32;
            assert!((field.elevation_at(t, 5.0) - field.edge_profile(Edge::Top, t)).abs() < EPS);
            assert!((field.elevation_at(t, -5.0) - field.edge_profile(Edge::Bottom, t)).abs() < EPS);
            assert!((field.elevation_at(-5.0, t) - field.edge_profile(Edge::Left, t)).abs() < EPS);
            assert!((field.elevation_at(5.0, t) - field.edge_profile(Edge::Right, t)).abs() < EPS);
        }
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let field = HeightField::new(
            CornerElevations { top_left: 9, top_right: -4, bottom_left: 2, bottom_right: 6 },
            EdgeModifiers {
                top: ModifierShape::FullDip,
                left: ModifierShape::Cliff,
                right: ModifierShape::HalfHill,
                bottom: ModifierShape::FullHill,
            },
        );
        let first = field.elevation_at(1.25, -3.5);
        for _ in 0..10 {
            assert_eq!(field.elevation_at(1.25, -3.5).to_bits(), first.to_bits());
        }
    }

    #[test]
    fn test_average_elevation() {
        let e = CornerElevations { top_left: 1, top_right: 2, bottom_left: 3, bottom_right: 6 };
        assert_eq!(e.average(), 3.0);

        let high = CornerElevations::uniform(i32::MAX);
        assert_eq!(high.average(), i32::MAX as f32);
        let mixed = CornerElevations { top_left: i32::MIN, top_right: i32::MAX, bottom_left: i32::MIN, bottom_right: i32::MAX };
        assert_eq!(mixed.average(), -0.5);
    }
}
