//! Tiled landscape terrain library
//!
//! A terrain is a sparse grid of square tiles. Each tile's surface is defined
//! by four integer corner elevations and four edge modifier curves, and
//! neighbouring tiles share their edges and corners so the surface stays
//! seamless while it is edited.

pub mod ascii;
pub mod direction;
pub mod elevation;
pub mod error;
pub mod export;
pub mod generator;
pub mod layout;
pub mod logging;
pub mod mesh;
pub mod modifier;
pub mod object;
pub mod persistence;
pub mod terrain;
pub mod tile;
pub mod tilemap;

pub use direction::{Anchor, Corner, Edge, TileCoord};
pub use elevation::{CornerElevations, EdgeModifiers, HeightField};
pub use error::{TerrainError, TerrainResult};
pub use modifier::ModifierShape;
pub use object::TerrainObject;
pub use terrain::{SeamViolation, Terrain};
pub use tile::Tile;
