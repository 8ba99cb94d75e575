//! Error types for terrain editing, persistence and export.

use thiserror::Error;

use crate::direction::TileCoord;

#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("No tile at {0}")]
    TileNotFound(TileCoord),

    #[error("A tile already exists at {0}")]
    TileExists(TileCoord),

    #[error("Invalid tile name: {0}")]
    InvalidTileName(String),

    #[error("Unknown modifier shape: {0}")]
    InvalidShape(String),

    #[error("Save file version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type TerrainResult<T> = Result<T, TerrainError>;
