//! Grid coordinates and the compass vocabulary shared by tiles and the terrain.
//!
//! `Top` points towards `+y` in grid space (`+z` in world space) and `Right`
//! towards `+x`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TerrainError;

/// Side length of a tile in world units.
pub const TILE_SIZE: f32 = 10.0;

/// Half the side length; local tile coordinates span `[-HALF_TILE, HALF_TILE]`.
pub const HALF_TILE: f32 = 5.0;

/// Integer grid position of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const ORIGIN: TileCoord = TileCoord { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The coordinate one step away in the given direction.
    pub fn neighbor(self, anchor: Anchor) -> Self {
        let (dx, dy) = anchor.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// World-space offset of the tile centre: `(x * 10, 0, y * 10)`.
    pub fn world_offset(self) -> [f32; 3] {
        [self.x as f32 * TILE_SIZE, 0.0, self.y as f32 * TILE_SIZE]
    }

    /// Tile containing a world-space point on the XZ plane.
    pub fn containing(world_x: f32, world_z: f32) -> Self {
        Self::new(
            (world_x / TILE_SIZE).round() as i32,
            (world_z / TILE_SIZE).round() as i32,
        )
    }

    pub fn name(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tile_{}_{}", self.x, self.y)
    }
}

impl FromStr for TileCoord {
    type Err = TerrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TerrainError::InvalidTileName(s.to_string());
        let rest = s.strip_prefix("Tile_").ok_or_else(invalid)?;
        // Split on the last underscore so negative x values keep their sign.
        let (x, y) = rest.rsplit_once('_').ok_or_else(invalid)?;
        let x = x.parse().map_err(|_| invalid())?;
        let y = y.parse().map_err(|_| invalid())?;
        Ok(Self::new(x, y))
    }
}

/// One of the eight positions surrounding a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Anchor {
    /// All anchors in neighbor discovery order.
    pub const ALL: [Anchor; 8] = [
        Anchor::TopLeft,
        Anchor::Top,
        Anchor::TopRight,
        Anchor::Left,
        Anchor::Right,
        Anchor::BottomLeft,
        Anchor::Bottom,
        Anchor::BottomRight,
    ];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Anchor::TopLeft => (-1, 1),
            Anchor::Top => (0, 1),
            Anchor::TopRight => (1, 1),
            Anchor::Left => (-1, 0),
            Anchor::Right => (1, 0),
            Anchor::BottomLeft => (-1, -1),
            Anchor::Bottom => (0, -1),
            Anchor::BottomRight => (1, -1),
        }
    }

    pub fn opposite(self) -> Anchor {
        match self {
            Anchor::TopLeft => Anchor::BottomRight,
            Anchor::Top => Anchor::Bottom,
            Anchor::TopRight => Anchor::BottomLeft,
            Anchor::Left => Anchor::Right,
            Anchor::Right => Anchor::Left,
            Anchor::BottomLeft => Anchor::TopRight,
            Anchor::Bottom => Anchor::Top,
            Anchor::BottomRight => Anchor::TopLeft,
        }
    }

    /// Index into per-anchor arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The shared edge for orthogonal anchors, `None` for diagonals.
    pub fn edge(self) -> Option<Edge> {
        match self {
            Anchor::Top => Some(Edge::Top),
            Anchor::Left => Some(Edge::Left),
            Anchor::Right => Some(Edge::Right),
            Anchor::Bottom => Some(Edge::Bottom),
            _ => None,
        }
    }
}

/// A side of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Left,
    Right,
    Bottom,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Left, Edge::Right, Edge::Bottom];

    pub fn opposite(self) -> Edge {
        match self {
            Edge::Top => Edge::Bottom,
            Edge::Left => Edge::Right,
            Edge::Right => Edge::Left,
            Edge::Bottom => Edge::Top,
        }
    }

    /// Direction of the tile across this edge.
    pub fn anchor(self) -> Anchor {
        match self {
            Edge::Top => Anchor::Top,
            Edge::Left => Anchor::Left,
            Edge::Right => Anchor::Right,
            Edge::Bottom => Anchor::Bottom,
        }
    }

    /// Corners joined by the edge, as `(first, second)`: `first` sits at the
    /// `-5` end of the edge parameter and `second` at `+5`.
    pub fn corners(self) -> (Corner, Corner) {
        match self {
            Edge::Top => (Corner::TopLeft, Corner::TopRight),
            Edge::Bottom => (Corner::BottomLeft, Corner::BottomRight),
            Edge::Left => (Corner::BottomLeft, Corner::TopLeft),
            Edge::Right => (Corner::BottomRight, Corner::TopRight),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Top => write!(f, "top"),
            Edge::Left => write!(f, "left"),
            Edge::Right => write!(f, "right"),
            Edge::Bottom => write!(f, "bottom"),
        }
    }
}

/// A corner of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// The other three tiles touching this corner, each paired with the
    /// corner of that tile which coincides with this one.
    pub fn shared_with(self) -> [(Anchor, Corner); 3] {
        match self {
            Corner::TopLeft => [
                (Anchor::TopLeft, Corner::BottomRight),
                (Anchor::Top, Corner::BottomLeft),
                (Anchor::Left, Corner::TopRight),
            ],
            Corner::TopRight => [
                (Anchor::Top, Corner::BottomRight),
                (Anchor::TopRight, Corner::BottomLeft),
                (Anchor::Right, Corner::TopLeft),
            ],
            Corner::BottomLeft => [
                (Anchor::Left, Corner::BottomRight),
                (Anchor::BottomLeft, Corner::TopRight),
                (Anchor::Bottom, Corner::TopLeft),
            ],
            Corner::BottomRight => [
                (Anchor::Right, Corner::BottomLeft),
                (Anchor::BottomRight, Corner::TopLeft),
                (Anchor::Bottom, Corner::TopRight),
            ],
        }
    }

    /// Local `(x, z)` position of the corner.
    pub fn local_position(self) -> (f32, f32) {
        match self {
            Corner::TopLeft => (-HALF_TILE, HALF_TILE),
            Corner::TopRight => (HALF_TILE, HALF_TILE),
            Corner::BottomLeft => (-HALF_TILE, -HALF_TILE),
            Corner::BottomRight => (HALF_TILE, -HALF_TILE),
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Corner::TopLeft => write!(f, "top-left"),
            Corner::TopRight => write!(f, "top-right"),
            Corner::BottomLeft => write!(f, "bottom-left"),
            Corner::BottomRight => write!(f, "bottom-right"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_name_round_trip_with_negative_coords() {
        let coord = TileCoord::new(-3, 12);
        assert_eq!(coord.name(), "Tile_-3_12");
        assert_eq!("Tile_-3_12".parse::<TileCoord>().unwrap(), coord);
        assert_eq!("Tile_4_-1".parse::<TileCoord>().unwrap(), TileCoord::new(4, -1));
    }

    #[test]
    fn test_invalid_tile_names_rejected() {
        assert!("LandscapeTile_1_2".parse::<TileCoord>().is_err());
        assert!("Tile_1".parse::<TileCoord>().is_err());
        assert!("Tile_a_b".parse::<TileCoord>().is_err());
    }

    #[test]
    fn test_opposites_are_involutions() {
        for anchor in Anchor::ALL {
            assert_eq!(anchor.opposite().opposite(), anchor);
            let (dx, dy) = anchor.offset();
            let (ox, oy) = anchor.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
        for edge in Edge::ALL {
            assert_eq!(edge.opposite().opposite(), edge);
            assert_eq!(edge.anchor().edge(), Some(edge));
        }
    }

    #[test]
    fn test_shared_corners_coincide_in_world_space() {
        let origin = TileCoord::ORIGIN;
        for corner in Corner::ALL {
            let (cx, cz) = corner.local_position();
            for (anchor, other) in corner.shared_with() {
                let n = origin.neighbor(anchor);
                let (ox, oz) = other.local_position();
                let wx = n.x as f32 * TILE_SIZE + ox;
                let wz = n.y as f32 * TILE_SIZE + oz;
                assert_eq!((wx, wz), (cx, cz), "{} via {:?}", corner, anchor);
            }
        }
    }

    #[test]
    fn test_containing_tile() {
        assert_eq!(TileCoord::containing(0.0, 0.0), TileCoord::ORIGIN);
        assert_eq!(TileCoord::containing(12.0, -7.0), TileCoord::new(1, -1));
        assert_eq!(TileCoord::containing(-14.9, 24.0), TileCoord::new(-1, 2));
    }
}
