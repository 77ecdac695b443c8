//! Decoded tile content and the content factory seam.
//!
//! The decode worker hands a fetched payload to a [`ContentFactory`],
//! which dispatches on the content type (glTF, batched 3D model, external
//! tileset descriptor, ...) and produces a [`TileContent`]. The formats
//! themselves are opaque to the tile lifecycle; the one thing the core
//! asks of decoded geometry is texture coordinate generation for raster
//! overlays, expressed by the [`ModelGeometry`] trait.

use crate::geodetic::{BoundingVolume, Projection, Rectangle};
use crate::tile::{Tile, TileId, TileRefine};
use bytes::Bytes;
use glam::DMat4;
use std::fmt;

/// Decoded renderable geometry.
///
/// Implemented by the glTF decoder (out of scope here); the lifecycle only
/// needs to ask the model for overlay texture coordinates while the decode
/// worker still has exclusive access to it.
pub trait ModelGeometry: Send {
    /// Generates a set of texture coordinates for draping overlay imagery.
    ///
    /// `projection_id` names the set; it is dense, starts at 0, and equal
    /// projections share one set. `rectangle` is the tile's footprint
    /// projected under `projection`.
    fn generate_overlay_texture_coordinates(
        &mut self,
        projection_id: u32,
        projection: &Projection,
        rectangle: &Rectangle,
    );
}

/// Content produced by the factory for one tile.
pub struct TileContent {
    /// Decoded geometry. Absent when the content was an external-tileset
    /// descriptor or intentionally blank.
    pub model: Option<Box<dyn ModelGeometry>>,

    /// New child tiles described by the content (external tilesets,
    /// implicit tiling). Applied to the tile at most once, in `update`.
    pub child_tiles: Option<Vec<Tile>>,

    /// A tighter bounding volume than the one announced by the parent
    /// metadata, discovered during decode.
    pub updated_bounding_volume: Option<BoundingVolume>,
}

impl TileContent {
    /// Content with no model, children, or refined volume.
    pub fn empty() -> Self {
        Self {
            model: None,
            child_tiles: None,
            updated_bounding_volume: None,
        }
    }

    /// Content consisting of a decoded model.
    pub fn with_model(model: Box<dyn ModelGeometry>) -> Self {
        Self {
            model: Some(model),
            child_tiles: None,
            updated_bounding_volume: None,
        }
    }
}

impl fmt::Debug for TileContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileContent")
            .field("model", &self.model.as_ref().map(|_| "<geometry>"))
            .field(
                "child_tiles",
                &self.child_tiles.as_ref().map(|children| children.len()),
            )
            .field("updated_bounding_volume", &self.updated_bounding_volume)
            .finish()
    }
}

/// Everything the factory needs to decode one tile's payload.
///
/// A snapshot of the tile taken when the load began, plus the fetched
/// bytes. The factory never sees the live tile.
#[derive(Debug, Clone)]
pub struct TileContentInput {
    pub id: TileId,
    pub bounding_volume: BoundingVolume,
    pub geometric_error: f64,
    pub transform: DMat4,
    pub content_bounding_volume: Option<BoundingVolume>,
    pub refine: TileRefine,
    pub url: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Decodes fetched payloads into [`TileContent`].
///
/// Runs on the worker pool. Returning `None` means the payload carried
/// nothing renderable; the tile still finishes loading as a blank tile.
pub trait ContentFactory: Send + Sync {
    fn create_content(&self, input: TileContentInput) -> Option<TileContent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullModel;

    impl ModelGeometry for NullModel {
        fn generate_overlay_texture_coordinates(
            &mut self,
            _projection_id: u32,
            _projection: &Projection,
            _rectangle: &Rectangle,
        ) {
        }
    }

    #[test]
    fn test_empty_content() {
        let content = TileContent::empty();
        assert!(content.model.is_none());
        assert!(content.child_tiles.is_none());
        assert!(content.updated_bounding_volume.is_none());
    }

    #[test]
    fn test_with_model() {
        let content = TileContent::with_model(Box::new(NullModel));
        assert!(content.model.is_some());
    }

    #[test]
    fn test_debug_does_not_expose_geometry() {
        let content = TileContent::with_model(Box::new(NullModel));
        let debug = format!("{:?}", content);
        assert!(debug.contains("<geometry>"));
    }
}
